use ort::session::Session;
use tracing::debug;

use super::{artefact::OnnxArtefact, errors::OnnxModelError};

/// Verify `artefact` and open an inference session over it.
pub(super) fn open_session(artefact: &OnnxArtefact) -> Result<Session, OnnxModelError> {
    artefact.verify()?;
    let session = Session::builder()
        .map_err(OnnxModelError::CreateSessionBuilder)?
        .commit_from_file(&artefact.path)
        .map_err(OnnxModelError::CreateSession)?;
    debug!(
        path = %artefact.path.display(),
        inputs = ?input_names(&session),
        outputs = ?output_names(&session),
        "opened ONNX session"
    );
    Ok(session)
}

pub(super) fn input_names(session: &Session) -> Vec<&str> {
    session.inputs.iter().map(|input| input.name.as_str()).collect()
}

pub(super) fn output_names(session: &Session) -> Vec<&str> {
    session
        .outputs
        .iter()
        .map(|output| output.name.as_str())
        .collect()
}

pub(super) fn require_input(session: &Session, name: &str) -> Result<(), OnnxModelError> {
    if input_names(session).contains(&name) {
        Ok(())
    } else {
        Err(OnnxModelError::MissingInput {
            name: name.to_owned(),
        })
    }
}

pub(super) fn require_output(session: &Session, name: &str) -> Result<(), OnnxModelError> {
    if output_names(session).contains(&name) {
        Ok(())
    } else {
        Err(OnnxModelError::MissingOutput {
            name: name.to_owned(),
        })
    }
}
