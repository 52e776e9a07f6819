use std::fs;
use std::io::{self, prelude::*};
use std::path;

use env_logger;
use log;

use line_ext_sort::{ExternalSorter, ExternalSorterBuilder, Partition};

fn main() {
    env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();

    fs::write("part-0.txt", "banana\napple\n").unwrap();
    fs::write("part-1.txt", "cherry\napple").unwrap();

    let partitions = vec![Partition::new("part-0.txt"), Partition::new("part-1.txt")];
    let mut output_writer = io::BufWriter::new(fs::File::create("output.txt").unwrap());

    let sorter: ExternalSorter = ExternalSorterBuilder::new()
        .with_tmp_dir(path::Path::new("./"))
        .build()
        .unwrap();

    sorter.sort(&partitions, &mut output_writer).unwrap();
    output_writer.flush().unwrap();
}
