//! Container Format
//!
//! The compressed file opens with a header persisting the frequency table,
//! which is all the expander needs to rebuild the code tree by replaying
//! the exact construction the compressor ran.  Layout, all integers
//! little endian:
//!
//! ```text
//! offset  size  field
//! 0       4     S: number of distinct symbols
//! 4       4     N: total input bytes
//! 8       5*S   S records of (u8 symbol,u32 count), packed
//! 8+5*S   ...   bit payload, MSB-first, zero padded to a byte boundary
//! ```
//!
//! Reads are all-or-nothing: a short read on any field is fatal.

use std::io::{Read,Write};
use crate::{DYNERR,STDRESULT};
use crate::huffman::SymbolMap;

/// write the `(S,N,records)` prelude for this symbol map
pub fn write_header<W: Write>(writer: &mut W,map: &SymbolMap) -> STDRESULT {
    writer.write_all(&(map.len() as u32).to_le_bytes())?;
    writer.write_all(&map.total().to_le_bytes())?;
    for sym in map.iter() {
        writer.write_all(&[sym.value])?;
        writer.write_all(&sym.count.to_le_bytes())?;
    }
    Ok(())
}

/// Read back the prelude and rebuild the symbol map in stored order.
/// The declared counts are cross checked before they are trusted: more
/// than 256 records, a repeated symbol, a zero count, or a count sum
/// disagreeing with the declared total is a format mismatch.
pub fn read_header<R: Read>(reader: &mut R) -> Result<SymbolMap,DYNERR> {
    let mut quad: [u8;4] = [0;4];
    reader.read_exact(&mut quad)?;
    let symbol_count = u32::from_le_bytes(quad);
    reader.read_exact(&mut quad)?;
    let total = u32::from_le_bytes(quad);
    if symbol_count > 256 {
        log::error!("header declares {} distinct symbols",symbol_count);
        return Err(Box::new(crate::Error::FileFormatMismatch));
    }
    let mut records: Vec<(u8,u32)> = Vec::with_capacity(symbol_count as usize);
    let mut record: [u8;5] = [0;5];
    for _i in 0..symbol_count {
        reader.read_exact(&mut record)?;
        records.push((record[0],u32::from_le_bytes([record[1],record[2],record[3],record[4]])));
    }
    let map = SymbolMap::from_records(&records)?;
    if map.total() != total {
        log::error!("counts sum to {} but header declares {}",map.total(),total);
        return Err(Box::new(crate::Error::FileFormatMismatch));
    }
    Ok(map)
}

// *************** TESTS *****************

#[cfg(test)]
use std::io::Cursor;

#[test]
fn header_layout_is_little_endian() {
    let map = SymbolMap::from_records(&[(b'x',258),(b'y',1)]).expect("bad records");
    let mut buf: Vec<u8> = Vec::new();
    write_header(&mut buf,&map).expect("write failed");
    let header_str = "02 00 00 00 03 01 00 00 78 02 01 00 00 79 01 00 00 00";
    assert_eq!(buf,hex::decode(header_str.replace(" ","")).unwrap());
}

#[test]
fn header_round_trip() {
    let map = SymbolMap::from_records(&[(b'a',5),(b'b',2),(b'r',2),(b'c',1),(b'd',1)]).expect("bad records");
    let mut buf: Vec<u8> = Vec::new();
    write_header(&mut buf,&map).expect("write failed");
    let copy = read_header(&mut Cursor::new(buf)).expect("read failed");
    assert_eq!(copy.len(),5);
    assert_eq!(copy.total(),11);
    let order: Vec<u8> = copy.iter().map(|sym| sym.value).collect();
    assert_eq!(order,vec![b'a',b'b',b'r',b'c',b'd']);
}

#[test]
fn short_header_fails() {
    let header_str = "02 00 00 00 04 00 00 00 41 02 00";
    let mut src = Cursor::new(hex::decode(header_str.replace(" ","")).unwrap());
    read_header(&mut src).expect_err("read should have failed");
}

#[test]
fn zero_count_fails() {
    let header_str = "01 00 00 00 00 00 00 00 41 00 00 00 00";
    let dat = hex::decode(header_str.replace(" ","")).unwrap();
    read_header(&mut Cursor::new(dat)).expect_err("read should have failed");
}

#[test]
fn repeated_symbol_fails() {
    let header_str = "02 00 00 00 04 00 00 00 41 02 00 00 00 41 02 00 00 00";
    let dat = hex::decode(header_str.replace(" ","")).unwrap();
    read_header(&mut Cursor::new(dat)).expect_err("read should have failed");
}

#[test]
fn inconsistent_total_fails() {
    let header_str = "01 00 00 00 05 00 00 00 41 04 00 00 00";
    let dat = hex::decode(header_str.replace(" ","")).unwrap();
    read_header(&mut Cursor::new(dat)).expect_err("read should have failed");
}
