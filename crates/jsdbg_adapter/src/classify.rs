use jsdbg_bridge_core::JsdbgError;

/// Message codes the debug service uses once the debugged request is gone.
pub const REQUEST_ENDED_CODES: [&str; 2] = ["XDMP-NOREQUEST", "JSDBG-REQUESTRECORD"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The remote request finished or was killed; the session is over.
    RequestEnded,
    /// Anything else, including errors without a structured body.
    Fault,
}

pub fn classify(error: &JsdbgError) -> ErrorClass {
    match error.message_code() {
        Some(code) if REQUEST_ENDED_CODES.contains(&code) => ErrorClass::RequestEnded,
        _ => ErrorClass::Fault,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn request_ended_codes() {
        for code in REQUEST_ENDED_CODES {
            assert_eq!(classify(&JsdbgError::remote(code, "gone")), ErrorClass::RequestEnded);
        }
    }

    #[test]
    fn other_remote_codes_are_faults() {
        let err = JsdbgError::remote("JSDBG-BADLOCATION", "No code at line 400");
        assert_eq!(classify(&err), ErrorClass::Fault);
    }

    #[test]
    fn unstructured_errors_are_faults() {
        let malformed = JsdbgError::from_http(500, r#"{"errorResponse": {"message": "XDMP-NOREQUEST"}}"#.into());
        assert_eq!(classify(&malformed), ErrorClass::Fault);
        assert_eq!(classify(&JsdbgError::Timeout(Duration::from_secs(1))), ErrorClass::Fault);
        assert_eq!(classify(&JsdbgError::InvalidResponse("bad".into())), ErrorClass::Fault);
    }
}
