use snafu::Snafu;
use trendstore_core::{EngineError, schema::WorkbookError};

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display(
        "Failed to load schema workbook from {dir}: {source}. \
         Expected a directory of CSV sheets."
    ))]
    LoadWorkbook {
        dir: String,
        source: WorkbookError,
    },

    #[snafu(display("{source}"))]
    Engine {
        #[snafu(source(from(EngineError, Box::new)))]
        source: Box<EngineError>,
    },

    #[snafu(display("Failed to render response as JSON: {source}"))]
    Render { source: serde_json::Error },
}
