//! Classical Huffman Coding
//!
//! Compression runs in two passes over the input: a frequency scan that
//! builds an ordered symbol map, then an encoding pass that streams each
//! byte's codeword through the bit writer.  The container persists the
//! frequency table rather than the tree; expansion replays the identical
//! tree construction from the identical record order, so both sides agree
//! on every codeword no matter how ties between equal counts are broken.
//!
//! * Header integers are always little endian
//! * Codewords assign 0 to a left branch, 1 to a right branch
//! * An input of one distinct byte compresses to an empty payload, the
//!   expander emits it by the declared count alone

use bit_vec::BitVec;
use std::io::{Cursor,Read,Write,Seek,SeekFrom,BufReader,BufWriter};
use crate::DYNERR;
use crate::container;
use crate::tools::bits::{BitReader,BitWriter};
use crate::tools::btree::{Node,Tree};
use crate::tools::heap::{Keyed,MinHeap};

/// One distinct byte with its count and, during encoding, its codeword.
#[derive(Debug)]
pub struct Symbol {
    pub value: u8,
    pub count: u32,
    pub code: BitVec
}

/// Frequency table in first-seen order.  The order is load bearing: tree
/// construction consumes records in table order, and the expander rebuilds
/// the table from the header in the same order to replay the same
/// construction.
#[derive(Debug)]
pub struct SymbolMap {
    symbols: Vec<Symbol>,
    total: u32
}

impl SymbolMap {
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            total: 0
        }
    }
    /// Scan a byte stream to the end, counting every distinct byte.
    pub fn scan<R: Read>(reader: &mut R) -> Result<Self,DYNERR> {
        let mut map = Self::new();
        for byte in reader.bytes() {
            if map.total == u32::MAX {
                return Err(Box::new(crate::Error::FileTooLarge));
            }
            map.tally(byte?);
        }
        Ok(map)
    }
    /// Rebuild a map from stored `(value,count)` records, e.g. from the
    /// container header.  Zero counts, repeated values, and count sums
    /// beyond the 32 bit range are rejected as malformed.
    pub fn from_records(records: &[(u8,u32)]) -> Result<Self,DYNERR> {
        let mut map = Self::new();
        for (value,count) in records.iter().copied() {
            if count == 0 || map.find(value).is_some() {
                return Err(Box::new(crate::Error::FileFormatMismatch));
            }
            map.total = match map.total.checked_add(count) {
                Some(total) => total,
                None => return Err(Box::new(crate::Error::FileFormatMismatch))
            };
            map.symbols.push(Symbol { value, count, code: BitVec::new() });
        }
        Ok(map)
    }
    /// count one occurrence of `value`, appending a record on first sight
    pub fn tally(&mut self,value: u8) {
        match self.symbols.iter_mut().find(|sym| sym.value == value) {
            Some(sym) => sym.count += 1,
            None => self.symbols.push(Symbol { value, count: 1, code: BitVec::new() })
        }
        self.total += 1;
    }
    /// linear search in table order
    pub fn find(&self,value: u8) -> Option<&Symbol> {
        self.symbols.iter().find(|sym| sym.value == value)
    }
    pub fn get(&self,idx: usize) -> Option<&Symbol> {
        self.symbols.get(idx)
    }
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
    /// number of distinct byte values seen
    pub fn len(&self) -> usize {
        self.symbols.len()
    }
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
    /// total bytes counted
    pub fn total(&self) -> u32 {
        self.total
    }
    fn set_code(&mut self,idx: usize,code: BitVec) {
        if let Some(sym) = self.symbols.get_mut(idx) {
            sym.code = code;
        }
    }
}

/// Tree payload.  Leaves reference a symbol map record by index, merged
/// nodes are synthetic and carry only the aggregate count.
#[derive(Clone,Debug,PartialEq)]
pub struct Weight {
    symbol: Option<usize>,
    count: u32
}

impl Keyed for Tree<Weight> {
    fn key(&self) -> u64 {
        self.root().data().count as u64
    }
}

/// Merge the two lightest trees under a synthetic root until one optimal
/// prefix code tree remains.  Returns `None` for an empty map.  The first
/// extraction becomes the left child, so identical maps always rebuild
/// identical trees.
pub fn build_tree(map: &SymbolMap) -> Option<Tree<Weight>> {
    let mut heap: MinHeap<Tree<Weight>> = MinHeap::new();
    for (idx,sym) in map.iter().enumerate() {
        heap.insert(Tree::leaf(Weight { symbol: Some(idx), count: sym.count }));
    }
    while heap.len() > 1 {
        let t1 = heap.extract_min()?;
        let t2 = heap.extract_min()?;
        let count = t1.root().data().count + t2.root().data().count;
        heap.insert(Tree::merge(t1,t2,Weight { symbol: None, count }));
    }
    heap.extract_min()
}

/// Depth-first walk assigning codewords: push 0 to descend left, 1 to
/// descend right, and give a leaf the accumulated path.  The lone leaf of
/// a one-symbol tree gets the empty codeword.
pub fn build_codebook(tree: &Tree<Weight>,map: &mut SymbolMap) {
    let mut path = BitVec::new();
    assign_codes(tree.root(),&mut path,map);
}

/// render the tree in preorder for debug logs, one node per line
fn render_pre_order(node: &Node<Weight>,map: &SymbolMap,indent: usize,out: &mut String) {
    out.push('|');
    for _i in 0..indent {
        out.push('-');
    }
    match node.data().symbol.and_then(|idx| map.get(idx)) {
        Some(sym) => out.push_str(&format!("symbol {:#04x} count {}\n",sym.value,sym.count)),
        None => out.push_str(&format!("count {}\n",node.data().count))
    }
    if let Some(left) = node.left() {
        render_pre_order(left,map,indent+1,out);
    }
    if let Some(right) = node.right() {
        render_pre_order(right,map,indent+1,out);
    }
}

fn log_tree(tree: &Tree<Weight>,map: &SymbolMap) {
    if log::log_enabled!(log::Level::Debug) {
        let mut out = String::new();
        render_pre_order(tree.root(),map,0,&mut out);
        log::debug!("code tree depth {}\n{}",tree.depth(),out);
    }
}

fn assign_codes(node: &Node<Weight>,path: &mut BitVec,map: &mut SymbolMap) {
    if node.is_leaf() {
        if let Some(idx) = node.data().symbol {
            map.set_code(idx,path.clone());
        }
        return;
    }
    if let Some(left) = node.left() {
        path.push(false);
        assign_codes(left,path,map);
        path.pop();
    }
    if let Some(right) = node.right() {
        path.push(true);
        assign_codes(right,path,map);
        path.pop();
    }
}

/// Main compression function.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let expanded_length = expanded_in.seek(SeekFrom::End(0))?;
    if expanded_length > u32::MAX as u64 {
        return Err(Box::new(crate::Error::FileTooLarge));
    }
    expanded_in.seek(SeekFrom::Start(0))?;
    log::debug!("scan frequencies");
    let mut map = {
        let mut reader = BufReader::new(&mut *expanded_in);
        SymbolMap::scan(&mut reader)?
    };
    log::debug!("{} distinct symbols in {} bytes",map.len(),map.total());
    let tree = build_tree(&map);
    if let Some(tree) = &tree {
        log_tree(tree,&map);
        build_codebook(tree,&mut map);
        for sym in map.iter() {
            log::trace!("symbol {:#04x} count {} code {:?}",sym.value,sym.count,sym.code);
        }
    }
    let mut writer = BufWriter::new(compressed_out);
    container::write_header(&mut writer,&map)?;
    // second pass over the input streams every codeword
    expanded_in.seek(SeekFrom::Start(0))?;
    let mut reader = BufReader::new(expanded_in);
    let mut bits = BitWriter::new(&mut writer);
    for byte in reader.bytes() {
        match map.find(byte?) {
            Some(sym) => bits.put_code(&sym.code)?,
            None => return Err(Box::new(crate::Error::FileFormatMismatch))
        };
    }
    bits.flush(true)?;
    writer.flush()?;
    Ok((expanded_length,writer.stream_position()?))
}

/// Main expansion function.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let compressed_size = compressed_in.seek(SeekFrom::End(0))?;
    compressed_in.seek(SeekFrom::Start(0))?;
    let mut reader = BufReader::new(compressed_in);
    let map = container::read_header(&mut reader)?;
    log::debug!("header declares {} distinct symbols in {} bytes",map.len(),map.total());
    let mut writer = BufWriter::new(expanded_out);
    match build_tree(&map) {
        None => {
            log::debug!("empty archive, nothing follows the header");
        },
        Some(tree) if tree.root().is_leaf() => {
            // one distinct symbol: the codeword is empty, emission is
            // driven by the declared count without consuming any bits
            let idx = tree.root().data().symbol.ok_or(crate::Error::FileFormatMismatch)?;
            let value = map.get(idx).ok_or(crate::Error::FileFormatMismatch)?.value;
            for _i in 0..map.total() {
                writer.write_all(&[value])?;
            }
        },
        Some(tree) => {
            log_tree(&tree,&map);
            let mut bits = BitReader::new(&mut reader);
            let mut node = tree.root();
            let mut emitted: u32 = 0;
            while emitted < map.total() {
                node = match bits.next_bit()? {
                    false => node.left().ok_or(crate::Error::FileFormatMismatch)?,
                    true => node.right().ok_or(crate::Error::FileFormatMismatch)?
                };
                if node.is_leaf() {
                    let idx = node.data().symbol.ok_or(crate::Error::FileFormatMismatch)?;
                    let value = map.get(idx).ok_or(crate::Error::FileFormatMismatch)?.value;
                    writer.write_all(&[value])?;
                    emitted += 1;
                    node = tree.root();
                }
            }
        }
    }
    writer.flush()?;
    Ok((compressed_size,writer.stream_position()?))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8]) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8]) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans)?;
    Ok(ans.into_inner())
}

// *************** TESTS *****************

#[test]
fn empty_file() {
    let compressed = compress_slice(&[]).expect("compression failed");
    assert_eq!(compressed,hex::decode("0000000000000000").unwrap());
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(expanded.len(),0);
}

#[test]
fn single_symbol_has_empty_payload() {
    let compressed = compress_slice("AAAA".as_bytes()).expect("compression failed");
    // S=1, N=4, one record ('A',4), not a single payload byte
    assert_eq!(compressed,hex::decode("01000000040000004104000000").unwrap());
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(expanded,"AAAA".as_bytes().to_vec());
}

#[test]
fn two_symbols_pack_into_one_byte() {
    let compressed = compress_slice("ABAB".as_bytes()).expect("compression failed");
    // records keep first-seen order regardless of how the tie broke
    assert_eq!(compressed[0..18].to_vec(),hex::decode("020000000400000041020000004202000000").unwrap());
    // 4 payload bits zero padded into a single byte
    assert_eq!(compressed.len(),19);
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(expanded,"ABAB".as_bytes().to_vec());
}

#[test]
fn textbook_case() {
    let compressed = compress_slice("abracadabra".as_bytes()).expect("compression failed");
    // S=5, N=11, counts a:5 b:2 r:2 c:1 d:1 in first-seen order
    let header = "050000000b00000061050000006202000000720200000063010000006401000000";
    assert_eq!(compressed[0..33].to_vec(),hex::decode(header).unwrap());
    // any optimal tree for these counts codes the payload in 23 bits
    assert_eq!(compressed.len(),36);
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(expanded,"abracadabra".as_bytes().to_vec());
}

#[test]
fn binary_content_round_trip() {
    let mut dat: Vec<u8> = Vec::new();
    for _i in 0..4 {
        for byte in 0..=255u8 {
            dat.push(byte);
        }
    }
    let compressed = compress_slice(&dat).expect("compression failed");
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(expanded,dat);
}

#[test]
fn random_content_round_trip() {
    use rand::{RngCore,SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x1d2c3b4a);
    let mut dat = vec![0u8;65536];
    rng.fill_bytes(&mut dat);
    let compressed = compress_slice(&dat).expect("compression failed");
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(expanded,dat);
}

#[test]
fn truncated_payload_fails() {
    let compressed = compress_slice("abracadabra".as_bytes()).expect("compression failed");
    expand_slice(&compressed[0..compressed.len()-1]).expect_err("expansion should have failed");
}

#[test]
fn trailing_garbage_is_ignored() {
    let mut compressed = compress_slice("abracadabra".as_bytes()).expect("compression failed");
    compressed.extend_from_slice(&[0xde,0xad,0xbe,0xef]);
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(expanded,"abracadabra".as_bytes().to_vec());
}

#[test]
fn frequencies_are_conserved() {
    let dat = "the rain in spain stays mainly in the plain".as_bytes();
    let map = SymbolMap::scan(&mut Cursor::new(dat)).expect("scan failed");
    assert_eq!(map.total(),dat.len() as u32);
    assert_eq!(map.iter().map(|sym| sym.count).sum::<u32>(),map.total());
    assert_eq!(map.find(b'a').unwrap().count,5);
    assert!(map.find(b'q').is_none());
}

#[test]
fn construction_is_idempotent() {
    let dat = "mississippi river".as_bytes();
    let map = SymbolMap::scan(&mut Cursor::new(dat)).expect("scan failed");
    let t1 = build_tree(&map).expect("no tree");
    let t2 = build_tree(&map).expect("no tree");
    assert_eq!(t1,t2);
}

#[test]
fn codebook_is_prefix_free() {
    let dat = "a man a plan a canal panama".as_bytes();
    let mut map = SymbolMap::scan(&mut Cursor::new(dat)).expect("scan failed");
    let tree = build_tree(&map).expect("no tree");
    build_codebook(&tree,&mut map);
    let codes: Vec<BitVec> = map.iter().map(|sym| sym.code.clone()).collect();
    for (i,a) in codes.iter().enumerate() {
        assert!(a.len() > 0);
        for (j,b) in codes.iter().enumerate() {
            if i == j {
                continue;
            }
            let shared = std::cmp::min(a.len(),b.len());
            let mut is_prefix = true;
            for k in 0..shared {
                if a.get(k) != b.get(k) {
                    is_prefix = false;
                    break;
                }
            }
            assert!(!is_prefix);
        }
    }
}

#[test]
fn fibonacci_weights_hit_the_depth_bound() {
    // eight symbols with Fibonacci counts force the worst-case chain
    let records: Vec<(u8,u32)> = [1,1,2,3,5,8,13,21].iter().enumerate()
        .map(|(value,count)| (value as u8,*count)).collect();
    let map = SymbolMap::from_records(&records).expect("bad records");
    let tree = build_tree(&map).expect("no tree");
    assert_eq!(tree.depth(),7);
}
