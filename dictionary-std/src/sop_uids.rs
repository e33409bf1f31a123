//! Well-known SOP class UIDs (§6 glossary "SOP class"), as compile-time
//! constants rather than a run-time dictionary: a DIMSE handler registry
//! keys off these directly, so there is no benefit to a lookup table here.
//! This is a small, representative slice (verification plus the
//! query/retrieve and storage classes exercised by `dicom-dimse`'s tests),
//! not the complete PS3.6 SOP class registry.

/// Verification SOP Class (C-ECHO).
pub const VERIFICATION: &str = "1.2.840.10008.1.1";

/// CT Image Storage (C-STORE).
pub const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";

/// Secondary Capture Image Storage (C-STORE).
pub const SECONDARY_CAPTURE_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.7";

/// Patient Root Query/Retrieve Information Model - FIND.
pub const PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_FIND: &str =
    "1.2.840.10008.5.1.4.1.2.1.1";

/// Patient Root Query/Retrieve Information Model - MOVE.
pub const PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_MOVE: &str =
    "1.2.840.10008.5.1.4.1.2.1.2";

/// Patient Root Query/Retrieve Information Model - GET.
pub const PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_GET: &str =
    "1.2.840.10008.5.1.4.1.2.1.3";

/// Study Root Query/Retrieve Information Model - FIND.
pub const STUDY_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_FIND: &str = "1.2.840.10008.5.1.4.1.2.2.1";

/// Study Root Query/Retrieve Information Model - MOVE.
pub const STUDY_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_MOVE: &str = "1.2.840.10008.5.1.4.1.2.2.2";
