use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("{0}")]
    Argument(String),

    #[error("cannot open input file {}: {source}", .path.display())]
    OpenInput { path: PathBuf, source: io::Error },

    #[error("cannot read input line {line}: {source}")]
    ReadInput { line: usize, source: io::Error },

    #[error("wrong number of fields: {fields} in input line {line}")]
    FieldCount { fields: usize, line: usize },

    #[error("connection to database failed: {0}")]
    Connection(String),

    #[error("query failed.\nError: {message}\nContent: '{query}'")]
    Query { message: String, query: String },

    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
