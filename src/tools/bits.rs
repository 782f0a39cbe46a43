//! Bit-level I/O for the Huffman coder.
//! The writer packs bits MSB-first into a small fixed buffer and hands
//! full buffers to the byte sink; the reader latches one byte at a time
//! and serves bits back in the same order.

use bit_vec::BitVec;
use std::io::{Read,Write};

/// bytes held before the writer flushes to the sink
const BUFFER_SIZE: usize = 10;

/// Writes a logical stream of bits to a byte sink, MSB-first within each
/// byte (bit 7 is filled first).  The buffer is kept zeroed at and beyond
/// the cursor, so writing a clear bit only advances the cursor.
pub struct BitWriter<W: Write> {
    sink: W,
    buf: [u8;BUFFER_SIZE],
    byte_idx: usize,
    bit_idx: usize
}

impl <W: Write> BitWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            buf: [0;BUFFER_SIZE],
            byte_idx: 0,
            bit_idx: 0
        }
    }
    /// write one bit, flushing the whole buffer to the sink when it fills
    pub fn put_bit(&mut self,bit: bool) -> Result<(),std::io::Error> {
        if bit {
            self.buf[self.byte_idx] |= 1 << (7 - self.bit_idx);
        }
        self.bit_idx += 1;
        if self.bit_idx > 7 {
            self.bit_idx = 0;
            self.byte_idx += 1;
            if self.byte_idx >= BUFFER_SIZE {
                self.flush(false)?;
            }
        }
        Ok(())
    }
    /// write every bit of a codeword
    pub fn put_code(&mut self,code: &BitVec) -> Result<(),std::io::Error> {
        for bit in code.iter() {
            self.put_bit(bit)?;
        }
        Ok(())
    }
    /// Write buffered bytes to the sink, then zero the buffer and reset the
    /// cursor.  With `only_used` this writes through the cursor byte and
    /// nothing at all if no bit is pending; it is the end-of-stream flush
    /// that truncates the output to the last partially used byte.  Unused
    /// trailing bits stay zero, the expander never reads them.
    pub fn flush(&mut self,only_used: bool) -> Result<(),std::io::Error> {
        if only_used {
            if self.bit_idx > 0 || self.byte_idx > 0 {
                self.sink.write_all(&self.buf[0..self.byte_idx+1])?;
            }
        } else {
            self.sink.write_all(&self.buf)?;
        }
        self.buf = [0;BUFFER_SIZE];
        self.byte_idx = 0;
        self.bit_idx = 0;
        Ok(())
    }
}

/// Serves a logical stream of bits from a byte source, MSB-first within
/// each byte.  Running out of source mid-read surfaces as `UnexpectedEof`,
/// the caller decides whether that is the normal end.
pub struct BitReader<R: Read> {
    src: R,
    latch: u8,
    bit_idx: usize
}

impl <R: Read> BitReader<R> {
    pub fn new(src: R) -> Self {
        Self {
            src,
            latch: 0,
            bit_idx: 0
        }
    }
    /// get the next bit, refilling the latch from the source on wrap
    pub fn next_bit(&mut self) -> Result<bool,std::io::Error> {
        if self.bit_idx == 0 {
            let mut by: [u8;1] = [0];
            self.src.read_exact(&mut by)?;
            self.latch = by[0];
        }
        let bit = (self.latch >> (7 - self.bit_idx)) & 1;
        self.bit_idx = (self.bit_idx + 1) % 8;
        Ok(bit == 1)
    }
}

// *************** TESTS *****************

#[test]
fn msb_first_packing() {
    let mut buf: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut buf);
    for bit in [true,false,true,false,false,false,false,true,true,true,false,false] {
        writer.put_bit(bit).expect("write failed");
    }
    writer.flush(true).expect("flush failed");
    assert_eq!(buf,vec![0xa1,0xc0]);
}

#[test]
fn final_flush_includes_the_cursor_byte() {
    // on a byte boundary the cursor already points at the next byte,
    // which goes out as a zero; the expander never reads it
    let mut buf: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut buf);
    for _i in 0..8 {
        writer.put_bit(true).expect("write failed");
    }
    writer.flush(true).expect("flush failed");
    assert_eq!(buf,vec![0xff,0x00]);
}

#[test]
fn partial_byte_is_zero_padded() {
    let mut buf: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut buf);
    writer.put_bit(true).expect("write failed");
    writer.put_bit(true).expect("write failed");
    writer.flush(true).expect("flush failed");
    assert_eq!(buf,vec![0xc0]);
}

#[test]
fn empty_stream_flushes_nothing() {
    let mut buf: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut buf);
    writer.flush(true).expect("flush failed");
    assert_eq!(buf.len(),0);
}

#[test]
fn buffer_spills_to_sink() {
    let mut buf: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut buf);
    // 85 set bits: the buffer turns over once at 80, 5 bits remain
    for _i in 0..85 {
        writer.put_bit(true).expect("write failed");
    }
    writer.flush(true).expect("flush failed");
    assert_eq!(buf.len(),11);
    assert_eq!(buf[9],0xff);
    assert_eq!(buf[10],0xf8);
}

#[test]
fn codeword_round_trip() {
    let mut code = BitVec::new();
    for bit in [true,false,true,true,false] {
        code.push(bit);
    }
    let mut buf: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut buf);
    writer.put_code(&code).expect("write failed");
    writer.flush(true).expect("flush failed");
    let mut reader = BitReader::new(std::io::Cursor::new(buf));
    for expected in [true,false,true,true,false] {
        assert_eq!(reader.next_bit().expect("read failed"),expected);
    }
}

#[test]
fn reader_reports_exhaustion() {
    let mut reader = BitReader::new(std::io::Cursor::new(vec![0x80]));
    for _i in 0..8 {
        reader.next_bit().expect("read failed");
    }
    let err = reader.next_bit().expect_err("read should have failed");
    assert_eq!(err.kind(),std::io::ErrorKind::UnexpectedEof);
}
