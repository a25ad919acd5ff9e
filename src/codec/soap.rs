//! SOAP 1.1 framing for OICP 2.0 - 2.2
//!
//! - **Body**  `<soapenv:Envelope><soapenv:Header/><soapenv:Body>{message}</soapenv:Body></soapenv:Envelope>`
//! - **Fault** `<soapenv:Body><soapenv:Fault><faultcode/><faultstring/></soapenv:Fault></soapenv:Body>`

use super::schema::{Namespace, Schema};
use super::xml::{parse_document, write_document, XmlNode};
use crate::support::errors::CodecError;

pub const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

const PREFIX: &str = "soapenv";

/// A parsed SOAP envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum SoapFrame {
    /// First element of the body: the OICP message root.
    Body(XmlNode),
    Fault { code: String, reason: String },
}

impl SoapFrame {
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let envelope = parse_document(text)?;
        if envelope.local_name() != "Envelope" {
            return Err(CodecError::Soap(format!(
                "expected Envelope, found {}",
                envelope.local_name()
            )));
        }

        let body = envelope
            .child("Body")
            .ok_or_else(|| CodecError::Soap("envelope has no Body".into()))?;
        let first = body
            .children
            .first()
            .ok_or_else(|| CodecError::Soap("Body is empty".into()))?;

        if first.local_name() == "Fault" {
            let text_of = |name: &str| {
                first
                    .child(name)
                    .map(|n| n.text.clone())
                    .unwrap_or_default()
            };
            return Ok(Self::Fault {
                code: text_of("faultcode"),
                reason: text_of("faultstring"),
            });
        }

        Ok(Self::Body(first.clone()))
    }

    /// Serialize with every OICP namespace declared on the envelope.
    pub fn serialize(&self, schema: &Schema) -> Result<String, CodecError> {
        let mut envelope = XmlNode::new(format!("{}:Envelope", PREFIX))
            .with_attribute(format!("xmlns:{}", PREFIX), ENVELOPE_NS);
        for ns in Namespace::ALL {
            envelope = envelope.with_attribute(
                format!("xmlns:{}", ns.prefix()),
                schema.namespace_uri(ns),
            );
        }

        let content = match self {
            Self::Body(node) => node.clone(),
            Self::Fault { code, reason } => {
                let mut faultcode = XmlNode::new("faultcode");
                faultcode.text = code.clone();
                let mut faultstring = XmlNode::new("faultstring");
                faultstring.text = reason.clone();
                XmlNode::new(format!("{}:Fault", PREFIX))
                    .with_child(faultcode)
                    .with_child(faultstring)
            }
        };

        let envelope = envelope
            .with_child(XmlNode::new(format!("{}:Header", PREFIX)))
            .with_child(XmlNode::new(format!("{}:Body", PREFIX)).with_child(content));
        write_document(&envelope)
    }

    pub fn fault(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fault {
            code: code.into(),
            reason: reason.into(),
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::version::OicpVersion;

    #[test]
    fn body_roundtrip() {
        let schema = Schema::new(OicpVersion::V2_1);
        let mut op = XmlNode::new("Authorization:OperatorID");
        op.text = "DE*GEF".into();
        let frame = SoapFrame::Body(XmlNode::new("Authorization:eRoamingAuthorizeStart").with_child(op));

        let text = frame.serialize(&schema).unwrap();
        assert!(text.contains(r#"xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/""#));
        assert!(text.contains("xmlns:Authorization=\"http://www.hubject.com/b2b/services/authorization/v2.1\""));

        match SoapFrame::parse(&text).unwrap() {
            SoapFrame::Body(node) => {
                assert_eq!(node.local_name(), "eRoamingAuthorizeStart");
                assert_eq!(node.child("OperatorID").unwrap().text, "DE*GEF");
            }
            other => panic!("expected body, got {:?}", other),
        }
    }

    #[test]
    fn fault_is_recognized() {
        let text = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
            <s:Body><s:Fault><faultcode>s:Client</faultcode><faultstring>bad</faultstring></s:Fault></s:Body>
        </s:Envelope>"#;
        let frame = SoapFrame::parse(text).unwrap();
        assert!(frame.is_fault());
        assert_eq!(frame, SoapFrame::fault("s:Client", "bad"));
    }

    #[test]
    fn non_envelopes_are_rejected() {
        assert!(matches!(SoapFrame::parse("<Foo/>"), Err(CodecError::Soap(_))));
        assert!(matches!(
            SoapFrame::parse(r#"<s:Envelope xmlns:s="x"><s:Body/></s:Envelope>"#),
            Err(CodecError::Soap(_))
        ));
    }
}
