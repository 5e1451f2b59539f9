//! SPNEGO tokens for `Authorization: Negotiate`.
//!
//! A Kerberos AP-REQ belongs to a single security context and servers with a
//! replay cache accept it once, so the Errata client asks its source for a
//! new token on every request. With the `kerberos` feature,
//! [`KerberosNegotiate`] builds tokens from the default credential cache
//! through GSSAPI.

use reqwest::Url;

use crate::{ClientError, Result};

/// Produces the base64 Negotiate token for one request.
pub trait NegotiateTokenSource: Send + Sync {
    fn token(&self, url: &Url) -> Result<String>;
}

/// Replays one caller-supplied token on every request.
#[derive(Debug, Clone)]
pub struct StaticNegotiateToken(String);

impl StaticNegotiateToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl NegotiateTokenSource for StaticNegotiateToken {
    fn token(&self, _url: &Url) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// GSSAPI host-based service name for `url`: `HTTP@<host>`.
pub fn service_name(url: &Url) -> Result<String> {
    url.host_str()
        .map(|host| format!("HTTP@{}", host))
        .ok_or_else(|| ClientError::Negotiate(format!("{} has no host", url)))
}

/// Source used when no explicit token is configured.
#[cfg(feature = "kerberos")]
pub fn default_source() -> Option<Box<dyn NegotiateTokenSource>> {
    Some(Box::new(KerberosNegotiate))
}

/// Source used when no explicit token is configured.
#[cfg(not(feature = "kerberos"))]
pub fn default_source() -> Option<Box<dyn NegotiateTokenSource>> {
    None
}

#[cfg(feature = "kerberos")]
pub use gssapi::KerberosNegotiate;

#[cfg(feature = "kerberos")]
mod gssapi {
    use base64::Engine;
    use libgssapi::context::{ClientCtx, CtxFlags};
    use libgssapi::name::Name;
    use libgssapi::oid::{GSS_MECH_KRB5, GSS_NT_HOSTBASED_SERVICE};
    use reqwest::Url;

    use super::{service_name, NegotiateTokenSource};
    use crate::{ClientError, Result};

    /// Initial context token from the default Kerberos credential cache.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct KerberosNegotiate;

    impl NegotiateTokenSource for KerberosNegotiate {
        fn token(&self, url: &Url) -> Result<String> {
            let service = service_name(url)?;
            let target =
                Name::new(service.as_bytes(), Some(&GSS_NT_HOSTBASED_SERVICE)).map_err(gss)?;
            let mut ctx = ClientCtx::new(
                None,
                target,
                CtxFlags::GSS_C_MUTUAL_FLAG,
                Some(&GSS_MECH_KRB5),
            );
            let token = ctx.step(None, None).map_err(gss)?.ok_or_else(|| {
                ClientError::Negotiate(format!("no initial token for {}", service))
            })?;
            Ok(base64::engine::general_purpose::STANDARD.encode(&*token))
        }
    }

    fn gss(err: libgssapi::error::Error) -> ClientError {
        ClientError::Negotiate(err.to_string())
    }
}
