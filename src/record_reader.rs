use std::error::Error;
use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::Error as IOError;
use std::io::ErrorKind;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use zstd::stream::read::Decoder as ZstdDecoder;

use crate::parser::RecordParser;

/// Rows sharing a context together with their labels.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub group_id: usize,
    pub rows: Vec<Vec<String>>,
    pub labels: Vec<i32>,
}

fn data_error(msg: String) -> Box<dyn Error> {
    Box::new(IOError::new(ErrorKind::Other, msg))
}

pub fn create_buffered_input(input_filename: &str) -> Result<Box<dyn BufRead>, Box<dyn Error>> {
    // Handler for different (or no) compression types
    let input = File::open(input_filename)
        .map_err(|e| data_error(format!("Could not open \"{}\": {}", input_filename, e)))?;

    let input_format = Path::new(input_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    let reader: Box<dyn BufRead> = match input_format {
        "gz" => Box::new(io::BufReader::new(MultiGzDecoder::new(input))),
        "zst" => Box::new(io::BufReader::new(ZstdDecoder::new(input)?)),
        _ => Box::new(io::BufReader::new(input)),
    };
    Ok(reader)
}

/// One positive group size per line.
pub fn read_group_sizes(input: &mut dyn BufRead) -> Result<Vec<usize>, Box<dyn Error>> {
    let mut sizes = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let size: usize = line
            .parse()
            .map_err(|_| data_error(format!("Group size on line {} is not a number: \"{}\"", i + 1, line)))?;
        if size == 0 {
            return Err(data_error(format!("Group size on line {} is 0", i + 1)));
        }
        sizes.push(size);
    }
    Ok(sizes)
}

pub fn read_group_sizes_from_filename(filename: &str) -> Result<Vec<usize>, Box<dyn Error>> {
    let mut input = create_buffered_input(filename)?;
    let sizes = read_group_sizes(&mut input)?;
    log::info!("Read {} group sizes from {}", sizes.len(), filename);
    Ok(sizes)
}

/// Cuts the record stream into groups. Without group sizes every record is its own group.
/// With group sizes the stream has to match them exactly: leftover records after the last
/// declared group and a stream that ends inside (or before) a declared group are errors.
pub struct GroupReader {
    input: Box<dyn BufRead>,
    parser: RecordParser,
    group_sizes: Option<Vec<usize>>,
    next_group_id: usize,
    pub records_read: u64,
}

impl GroupReader {
    pub fn new(input: Box<dyn BufRead>, group_sizes: Option<Vec<usize>>) -> GroupReader {
        GroupReader {
            input,
            parser: RecordParser::new(),
            group_sizes,
            next_group_id: 0,
            records_read: 0,
        }
    }

    pub fn next_group(&mut self) -> Result<Option<Group>, Box<dyn Error>> {
        let group_id = self.next_group_id;
        let size = match &self.group_sizes {
            None => 1,
            Some(sizes) => {
                if group_id >= sizes.len() {
                    if self.parser.next_record(&mut self.input)?.is_some() {
                        return Err(data_error(format!(
                            "Excess records after last declared group: {} groups covering {} records were declared",
                            sizes.len(),
                            self.records_read
                        )));
                    }
                    return Ok(None);
                }
                sizes[group_id]
            }
        };

        let mut group = Group {
            group_id,
            rows: Vec::with_capacity(size),
            labels: Vec::with_capacity(size),
        };
        while group.rows.len() < size {
            match self.parser.next_record(&mut self.input)? {
                Some(record) => {
                    self.records_read += 1;
                    group.rows.push(record.tokens);
                    group.labels.push(record.label);
                }
                None => {
                    if self.group_sizes.is_none() {
                        return Ok(None);
                    }
                    return Err(data_error(format!(
                        "Data ended in group {}: declared size {}, got {} records",
                        group_id,
                        size,
                        group.rows.len()
                    )));
                }
            }
        }
        self.next_group_id += 1;
        Ok(Some(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    fn reader(data: &'static str, sizes: Option<Vec<usize>>) -> GroupReader {
        GroupReader::new(Box::new(Cursor::new(data.as_bytes())), sizes)
    }

    #[test]
    fn test_single_record_groups() {
        let mut gr = reader("1 0:a\n0 0:b 1:c\n", None);
        let g = gr.next_group().unwrap().unwrap();
        assert_eq!(g.group_id, 0);
        assert_eq!(g.rows, vec![vec!["0:a".to_string()]]);
        assert_eq!(g.labels, vec![1]);
        let g = gr.next_group().unwrap().unwrap();
        assert_eq!(g.group_id, 1);
        assert_eq!(g.rows[0].len(), 2);
        assert!(gr.next_group().unwrap().is_none());
        assert_eq!(gr.records_read, 2);
    }

    #[test]
    fn test_sized_groups() {
        let mut gr = reader("1 0:a\n0 0:b\n0 0:c\n0 0:d\n1 0:e\n", Some(vec![3, 2]));
        let g = gr.next_group().unwrap().unwrap();
        assert_eq!(g.group_id, 0);
        assert_eq!(g.labels, vec![1, 0, 0]);
        let g = gr.next_group().unwrap().unwrap();
        assert_eq!(g.group_id, 1);
        assert_eq!(g.labels, vec![0, 1]);
        assert_eq!(g.rows[1], vec!["0:e".to_string()]);
        assert!(gr.next_group().unwrap().is_none());
    }

    #[test]
    fn test_excess_records_are_error() {
        let mut gr = reader("1 0:a\n0 0:b\n0 0:c\n", Some(vec![2]));
        assert!(gr.next_group().unwrap().is_some());
        let err = gr.next_group().unwrap_err();
        assert!(format!("{}", err).contains("Excess records"));
    }

    #[test]
    fn test_truncated_group_is_error() {
        let mut gr = reader("1 0:a\n0 0:b\n0 0:c\n", Some(vec![2, 2]));
        assert!(gr.next_group().unwrap().is_some());
        assert!(gr.next_group().is_err());

        // stream ends before a declared group even starts
        let mut gr = reader("1 0:a\n0 0:b\n", Some(vec![2, 1]));
        assert!(gr.next_group().unwrap().is_some());
        assert!(gr.next_group().is_err());
    }

    #[test]
    fn test_group_sizes() {
        let mut input = Cursor::new("3\n\n2\n1\n".as_bytes());
        assert_eq!(read_group_sizes(&mut input).unwrap(), vec![3, 2, 1]);
        let mut input = Cursor::new("3\n0\n".as_bytes());
        assert!(read_group_sizes(&mut input).is_err());
        let mut input = Cursor::new("3\nthree\n".as_bytes());
        assert!(read_group_sizes(&mut input).is_err());
    }

    #[test]
    fn test_compressed_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.gz");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(b"1 0:a 1:b\n0 0:c\n").unwrap();
            encoder.finish().unwrap();
        }
        let input = create_buffered_input(path.to_str().unwrap()).unwrap();
        let mut gr = GroupReader::new(input, Some(vec![2]));
        let g = gr.next_group().unwrap().unwrap();
        assert_eq!(g.labels, vec![1, 0]);
        assert!(gr.next_group().unwrap().is_none());

        let path = dir.path().join("train.zst");
        std::fs::write(&path, zstd::encode_all(&b"1 0:a\n"[..], 0).unwrap()).unwrap();
        let input = create_buffered_input(path.to_str().unwrap()).unwrap();
        let mut gr = GroupReader::new(input, None);
        assert_eq!(gr.next_group().unwrap().unwrap().labels, vec![1]);

        assert!(create_buffered_input(dir.path().join("missing.txt").to_str().unwrap()).is_err());
    }
}
