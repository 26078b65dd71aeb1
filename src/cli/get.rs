//! `get` and `dump`

use std::io::Write;

use crate::{
    command::Request,
    config::Options,
    document::Document,
    emit,
    error::{Error, Result},
    evaluator::Interpreter,
    output::Sink,
};

/// Evaluate each request against the document, in order.
///
/// Every request is parsed before anything is written, so an invalid
/// command anywhere fails the whole invocation with no output.
pub fn execute_get<W: Write>(
    doc: &Document,
    requests: &[String],
    options: &Options,
    out: W,
) -> Result<()> {
    if requests.is_empty() {
        return Err(Error::MissingArgument("path".to_string()));
    }
    let requests = requests
        .iter()
        .map(|text| Request::parse(text, options.input_delimiter))
        .collect::<Result<Vec<_>>>()?;

    let mut interp = Interpreter::new(Sink::new(out, options.clone()));
    for request in &requests {
        interp.run(&doc.root, request)?;
    }
    interp.sink().finish()
}

/// Write the structural listing of the whole document.
pub fn execute_dump<W: Write>(doc: &Document, mut out: W) -> Result<()> {
    out.write_all(emit::dump(&doc.root).as_bytes())
        .and_then(|()| out.flush())
        .map_err(Error::stdout)
}
