//! The SOP-class handler registry (§4.4): a reverse map from affected SOP
//! class UID to the handler that answers requests for it, installed before
//! an association is accepted and read-only thereafter (§5 "Shared
//! resources").

use std::collections::HashMap;
use std::fmt;

use dicom_core::dataset::InMemDataSet;

use snafu::OptionExt;

use crate::command::Command;
use crate::error::{Result, UnhandledSopClassSnafu};
use crate::status::Status;

/// What a SOP-class handler hands back to the DIMSE layer: the status to
/// place in the response command set, and an optional response dataset.
pub type HandlerResponse = (Status, Option<InMemDataSet>);

/// A SOP-class handler: given the request command and its dataset (if
/// any), produce the response status and dataset.
///
/// Boxed as `FnMut` rather than `Fn` so a handler can hold mutable state
/// (an open file, a query cursor) across calls within one association.
pub trait SopClassHandler: Send {
    fn handle(&mut self, command: &Command, dataset: Option<InMemDataSet>) -> HandlerResponse;
}

impl<F> SopClassHandler for F
where
    F: FnMut(&Command, Option<InMemDataSet>) -> HandlerResponse + Send,
{
    fn handle(&mut self, command: &Command, dataset: Option<InMemDataSet>) -> HandlerResponse {
        self(command, dataset)
    }
}

/// The reverse map from affected SOP class UID to its registered handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn SopClassHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("sop_classes", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        HandlerRegistry::default()
    }

    /// Register the handler that answers requests for `sop_class_uid`,
    /// replacing any prior registration for the same UID.
    pub fn register(&mut self, sop_class_uid: impl Into<String>, handler: impl SopClassHandler + 'static) {
        self.handlers.insert(sop_class_uid.into(), Box::new(handler));
    }

    /// Whether a handler is registered for `sop_class_uid`.
    pub fn supports(&self, sop_class_uid: &str) -> bool {
        self.handlers.contains_key(sop_class_uid)
    }

    /// Dispatch an inbound request to its registered handler (§4.4: "passing
    /// the service-group selector" is just `command.command_field`, already
    /// on the request).
    pub fn dispatch(&mut self, sop_class_uid: &str, command: &Command, dataset: Option<InMemDataSet>) -> Result<HandlerResponse> {
        let handler = self
            .handlers
            .get_mut(sop_class_uid)
            .context(UnhandledSopClassSnafu { sop_class_uid })?;
        Ok(handler.handle(command, dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandField;

    #[test]
    fn dispatches_to_registered_handler() {
        let mut registry = HandlerRegistry::new();
        registry.register("1.2.840.10008.1.1", |_cmd: &Command, _ds: Option<InMemDataSet>| {
            (Status::Success, None)
        });

        let request = Command::c_echo_rq(1);
        let (status, dataset) = registry.dispatch("1.2.840.10008.1.1", &request, None).unwrap();
        assert_eq!(status, Status::Success);
        assert!(dataset.is_none());
    }

    #[test]
    fn unregistered_sop_class_fails() {
        let mut registry = HandlerRegistry::new();
        let request = Command::request(CommandField::CStoreRq, "1.2.3", 1, true);
        assert!(registry.dispatch("1.2.3", &request, None).is_err());
    }
}
