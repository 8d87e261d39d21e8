use scorepipe_frame::{FrameConfig, FrameReader};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_messages, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = FrameConfig {
        max_payload_size: args.max_payload,
    };
    let mut reader = FrameReader::with_config(std::io::stdin().lock(), config);

    let mut messages = Vec::new();
    let failure = loop {
        match reader.next_message() {
            Ok(Some(values)) => messages.push(values),
            Ok(None) => break None,
            Err(err) => break Some(err),
        }
    };

    // Whatever decoded before a bad frame is still printed.
    print_messages(&messages, format);

    match failure {
        None => Ok(SUCCESS),
        Some(err) => Err(frame_error(
            &format!("decode failed after {} message(s)", messages.len()),
            err,
        )),
    }
}
