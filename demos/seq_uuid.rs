//! Simple command that prints one or '-n count' sequential UUID strings

use std::{env, io, io::Write, process::ExitCode};

use sequential_uuids::{uuid_sequence, uuid_time, SequenceSource};

struct InMemorySequence(i64);

impl SequenceSource for InMemorySequence {
    fn next_value(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

fn main() -> io::Result<ExitCode> {
    let opts = {
        let mut args = env::args();
        let program = args.next();
        match Options::parse(args) {
            Ok(opts) => opts,
            Err(message) => {
                eprintln!("Error: {}", message);
                eprintln!(
                    "Usage: {} [-n count] [-s]",
                    program.as_deref().unwrap_or("seq_uuid")
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    let mut seq = InMemorySequence(0);
    let mut buf = io::BufWriter::new(io::stdout());
    for _ in 0..opts.count {
        let result = if opts.sequence_mode {
            uuid_sequence(&mut seq, 65546, 65536)
        } else {
            uuid_time(60, 65536)
        };
        match result {
            Ok(uuid) => writeln!(buf, "{}", uuid)?,
            Err(err) => {
                eprintln!("Error: {}", err);
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

struct Options {
    count: usize,
    sequence_mode: bool,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut count = None;
        let mut sequence_mode = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-n" => {
                    if count.is_some() {
                        return Err("option 'n' given more than once".to_owned());
                    }
                    let Some(n_arg) = args.next() else {
                        return Err("argument to option 'n' missing".to_owned());
                    };
                    let Ok(c) = n_arg.parse() else {
                        return Err(format!("invalid argument to option 'n': '{}'", n_arg));
                    };
                    count.replace(c);
                }
                "-s" => sequence_mode = true,
                _ => return Err(format!("unrecognized argument '{}'", arg)),
            }
        }
        Ok(Self {
            count: count.unwrap_or(1),
            sequence_mode,
        })
    }
}
