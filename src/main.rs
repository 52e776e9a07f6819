use std::fs;
use std::io;
use std::path;
use std::process;

use bytesize::ByteSize;
use clap::ArgEnum;
use env_logger;
use log;

use line_ext_sort::{ExternalSorter, ExternalSorterBuilder, MemoryLimitedBufferBuilder, Partition};

fn main() {
    let arg_parser = build_arg_parser();

    let log_level: LogLevel = arg_parser.value_of_t_or_exit("log_level");
    init_logger(log_level);

    let tmp_dir: Option<&str> = arg_parser.value_of("tmp_dir");
    let chunk_size = arg_parser.value_of("chunk_size").expect("value has a default");

    let mut sorter_builder = ExternalSorterBuilder::new();
    if let Some(tmp_dir) = tmp_dir {
        sorter_builder = sorter_builder.with_tmp_dir(path::Path::new(tmp_dir));
    }

    sorter_builder = sorter_builder.with_buffer(MemoryLimitedBufferBuilder::new(
        chunk_size.parse::<ByteSize>().expect("value is pre-validated").as_u64(),
    ));

    let sorter: ExternalSorter<_> = match sorter_builder.build() {
        Ok(sorter) => sorter,
        Err(err) => {
            log::error!("sorter initialization error: {}", err);
            process::exit(1);
        }
    };

    let partitions = if let Some(input) = arg_parser.value_of("input") {
        let input_stream = match fs::File::open(input) {
            Ok(file) => io::BufReader::new(file),
            Err(err) => {
                log::error!("input file opening error: {}", err);
                process::exit(1);
            }
        };

        match sorter.split(input_stream) {
            Ok(partitions) => partitions,
            Err(err) => {
                log::error!("input splitting error: {}", err);
                process::exit(1);
            }
        }
    } else {
        Vec::from_iter(
            arg_parser
                .values_of("partitions")
                .into_iter()
                .flatten()
                .map(Partition::new),
        )
    };

    let output = arg_parser.value_of("output").expect("value is required");
    let output_stream = match fs::File::create(output) {
        Ok(file) => file,
        Err(err) => {
            log::error!("output file creation error: {}", err);
            process::exit(1);
        }
    };

    match sorter.sort(&partitions, output_stream) {
        Ok(records_count) => log::info!("{} records written to {}", records_count, output),
        Err(err) => {
            log::error!("data sorting error: {}", err);
            process::exit(1);
        }
    }
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Self::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <LogLevel as clap::ArgEnum>::from_str(s, false)
    }
}

fn build_arg_parser() -> clap::ArgMatches {
    clap::App::new("line-ext-sort")
        .about("sorts newline-delimited partition files and merges them into one output")
        .arg(
            clap::Arg::new("partitions")
                .help("partition files to be sorted in place and merged")
                .multiple_values(true)
                .takes_value(true)
                .required_unless_present("input")
                .conflicts_with("input"),
        )
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .help("file to be split into temporary partitions and sorted")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("result file")
                .required(true)
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("log_level")
                .short('l')
                .long("loglevel")
                .help("logging level")
                .takes_value(true)
                .default_value("info")
                .possible_values(LogLevel::possible_values()),
        )
        .arg(
            clap::Arg::new("tmp_dir")
                .short('d')
                .long("tmp-dir")
                .help("directory to be used to store temporary partitions")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("chunk_size")
                .short('c')
                .long("chunk-size")
                .help("partition size used when splitting the input")
                .takes_value(true)
                .default_value("64MB")
                .validator(|v| match v.parse::<ByteSize>() {
                    Ok(_) => Ok(()),
                    Err(err) => Err(format!("Chunk size format incorrect: {}", err)),
                }),
        )
        .get_matches()
}

fn init_logger(log_level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(match log_level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        })
        .format_timestamp_millis()
        .init();
}
