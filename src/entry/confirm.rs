use std::io::{BufRead, Write};

use volley::error::AppResult;

/// Asks the operator to type `yes` before a large run. End of input declines.
pub(super) fn confirm_large_run<R, W>(requests: u64, input: &mut R, output: &mut W) -> AppResult<bool>
where
    R: BufRead,
    W: Write,
{
    writeln!(
        output,
        "WARNING: Large number of requests specified ({}).",
        requests
    )?;
    write!(output, "Are you sure you want to proceed? (yes/no): ")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
