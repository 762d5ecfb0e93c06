//! Locating and encoding the compiled image.

use std::io;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use waca_core::Board;

use crate::ExecutorError;

/// File the toolchain writes into the output directory for `board`.
#[must_use]
pub fn artifact_file_name(sketch_file_name: &str, board: &Board) -> String {
    format!("{sketch_file_name}.{}", board.artifact_extension())
}

/// Read `output_dir/file_name` and return it base64-encoded.
///
/// # Errors
/// Returns [`ExecutorError::ArtifactMissing`] if the file does not exist and
/// [`ExecutorError::ArtifactRead`] for any other read failure.
pub async fn read_artifact(output_dir: &Path, file_name: &str) -> Result<String, ExecutorError> {
    match tokio::fs::read(output_dir.join(file_name)).await {
        Ok(bytes) => Ok(STANDARD.encode(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ExecutorError::ArtifactMissing {
            file_name: file_name.to_owned(),
        }),
        Err(e) => Err(ExecutorError::ArtifactRead(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_file_name_follows_board_family() {
        assert_eq!(
            artifact_file_name("ws.ino", &Board::new("arduino:avr:nano")),
            "ws.ino.hex"
        );
        assert_eq!(
            artifact_file_name("ws.ino", &Board::new("esp8266:esp8266:generic")),
            "ws.ino.bin"
        );
    }

    #[tokio::test]
    async fn read_artifact_encodes_base64() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        if let Err(e) = std::fs::write(dir.path().join("ws.ino.hex"), b"hello") {
            panic!("write: {e}");
        }
        let encoded = read_artifact(dir.path(), "ws.ino.hex").await.ok();
        assert_eq!(encoded.as_deref(), Some("aGVsbG8="));
    }

    #[tokio::test]
    async fn read_artifact_missing_file_is_distinct_error() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let result = read_artifact(dir.path(), "ws.ino.hex").await;
        assert!(
            matches!(&result, Err(ExecutorError::ArtifactMissing { file_name }) if file_name == "ws.ino.hex"),
            "got {result:?}"
        );
    }
}
