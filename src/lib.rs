//! # Huffpress Library
//!
//! Compress or expand files using classical Huffman coding
//! * `huffman` scans byte frequencies, builds the optimal prefix code tree, and runs the coding
//! * `container` reads and writes the header that lets the expander rebuild the same tree
//!
//! The compression/expansion functions are generics that operate on trait objects
//! with bounds `Read + Seek` or `Write + Seek`.  There are convenience functions for working
//! directly with buffers.
//!
//! ## File Example
//!
//! ```rs
//! use huffpress::huffman;
//! let mut in_file = std::fs::File::open("some_input_path").expect("open failed");
//! let mut out_file = std::fs::File::create("some_output_path").expect("create failed");
//! let (in_size,out_size) = huffman::compress(&mut in_file,&mut out_file)
//!     .expect("compression failed");
//! eprintln!("compressed {} into {}",in_size,out_size);
//! ```
//!
//! ## Buffer Example
//!
//! ```rs
//! use huffpress::huffman;
//! let test_data = "This is the chaunt of the priests.  The chaunt of the priests of Mung.".as_bytes();
//! let compressed = huffman::compress_slice(test_data).expect("compression failed");
//! ```

mod tools;
pub mod container;
pub mod huffman;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Coding Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("file format mismatch")]
    FileFormatMismatch,
    #[error("file too large")]
    FileTooLarge
}
