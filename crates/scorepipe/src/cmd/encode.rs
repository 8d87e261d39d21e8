use scorepipe_frame::encode_message;

use crate::cmd::EncodeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::print_raw;

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let encoded = encode_message(&args.values);
    tracing::debug!(values = args.values.len(), size = encoded.len(), "encoded message");
    print_raw(&encoded);
    Ok(SUCCESS)
}
