use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeatureMapError {
    #[error("malformed parameter file line {0}: expected '<name> <value>'")]
    MalformedLine(usize),

    #[error("parameter file line {0} has a value that does not parse as a float: '{1}'")]
    InvalidValue(usize, String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
