use clap::{arg,crate_version,ArgGroup,Command};
use huffpress::huffman;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    let long_help =
"Examples:
---------
Compress:      `huffpress -c my_file` writes my_file.hc
Expand:        `huffpress -d my_file.hc my_file.out`";

    let main_cmd = Command::new("huffpress")
        .about("Compress and expand files with classical Huffman coding")
        .after_long_help(long_help)
        .version(crate_version!())
        .arg(arg!(-c --compress <PATH> "compress a file").required(false))
        .arg(arg!(-d --decompress <PATH> "expand a compressed file").required(false))
        .arg(arg!([output] "output path, defaults to the input plus .hc or .hd"))
        .arg(arg!(--debug "verbose tracing on stderr"))
        .group(ArgGroup::new("mode").args(["compress","decompress"]).required(true));

    let matches = main_cmd.get_matches();

    let mut log_builder = env_logger::Builder::from_default_env();
    if matches.get_flag("debug") {
        log_builder.filter_level(log::LevelFilter::Debug);
    }
    log_builder.init();

    if let Some(path_in) = matches.get_one::<String>("compress") {
        let path_out = match matches.get_one::<String>("output") {
            Some(path) => path.clone(),
            None => [path_in,".hc"].concat()
        };
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::File::create(&path_out)?;
        let (in_size,out_size) = huffman::compress(&mut in_file,&mut out_file)?;
        eprintln!("compressed {} into {} bytes",in_size,out_size);
    }

    if let Some(path_in) = matches.get_one::<String>("decompress") {
        let path_out = match matches.get_one::<String>("output") {
            Some(path) => path.clone(),
            None => [path_in,".hd"].concat()
        };
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::File::create(&path_out)?;
        let (in_size,out_size) = huffman::expand(&mut in_file,&mut out_file)?;
        eprintln!("expanded {} into {} bytes",in_size,out_size);
    }

    Ok(())
}
