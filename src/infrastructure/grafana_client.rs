// Grafana render client - Solo panel PNG snapshots over HTTP
use crate::application::panel_renderer::PanelRenderer;
use crate::domain::render::{RenderRequest, RenderResult};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use openssl::error::ErrorStack;
use openssl::pkcs12::Pkcs12;
use reqwest::header::{HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;

/// Exactly one authentication mode per client, fixed at construction.
#[derive(Debug, Clone)]
pub enum RenderAuth {
    None,
    Header { name: String, value: SecretString },
    Certificate(ClientCertificate),
}

#[derive(Debug, Clone)]
pub struct ClientCertificate {
    /// PKCS#12 bundle holding the client certificate and private key.
    pub p12_path: PathBuf,
    pub password: SecretString,
    /// PEM bundle of additional trusted roots.
    pub ca_bundle: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct GrafanaClient {
    endpoint: String,
    auth_header: Option<(HeaderName, HeaderValue)>,
    client: reqwest::Client,
}

impl GrafanaClient {
    /// Certificate material is read and parsed here, so a bad bundle fails at
    /// startup rather than on the first request.
    pub fn new(endpoint: String, auth: RenderAuth) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        let mut auth_header = None;

        match auth {
            RenderAuth::None => {}
            RenderAuth::Header { name, value } => {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| AppError::Config(format!("invalid auth header name '{}': {}", name, e)))?;
                let mut value = HeaderValue::from_str(value.expose_secret())
                    .map_err(|e| AppError::Config(format!("invalid auth header value: {}", e)))?;
                value.set_sensitive(true);
                auth_header = Some((name, value));
            }
            RenderAuth::Certificate(cert) => {
                builder = Self::with_client_certificate(builder, &cert)?;
            }
        }

        let client = builder
            .build()
            .map_err(|e| AppError::Credential(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            auth_header,
            client,
        })
    }

    fn with_client_certificate(
        builder: reqwest::ClientBuilder,
        cert: &ClientCertificate,
    ) -> AppResult<reqwest::ClientBuilder> {
        let der = std::fs::read(&cert.p12_path).map_err(|e| {
            AppError::Credential(format!("cannot read {}: {}", cert.p12_path.display(), e))
        })?;
        let identity = reqwest::Identity::from_pkcs12_der(&der, cert.password.expose_secret())
            .map_err(|e| {
                AppError::Credential(format!("cannot load {}: {}", cert.p12_path.display(), e))
            })?;

        let mut builder = builder.use_native_tls().identity(identity);

        // The server may be signed by a CA that ships inside the bundle.
        let chain = bundled_ca_certificates(&der, cert.password.expose_secret()).map_err(|e| {
            AppError::Credential(format!("cannot load {}: {}", cert.p12_path.display(), e))
        })?;
        for ca in &chain {
            let root = reqwest::Certificate::from_der(ca).map_err(|e| {
                AppError::Credential(format!("bad CA in {}: {}", cert.p12_path.display(), e))
            })?;
            builder = builder.add_root_certificate(root);
        }

        if let Some(ca_path) = &cert.ca_bundle {
            let pem = std::fs::read(ca_path).map_err(|e| {
                AppError::Credential(format!("cannot read {}: {}", ca_path.display(), e))
            })?;
            let roots = reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| {
                AppError::Credential(format!("cannot parse {}: {}", ca_path.display(), e))
            })?;
            if roots.is_empty() {
                return Err(AppError::Credential(format!(
                    "{} contains no certificates",
                    ca_path.display()
                )));
            }
            for root in roots {
                builder = builder.add_root_certificate(root);
            }
        }

        tracing::info!(
            bundle = %cert.p12_path.display(),
            bundled_roots = chain.len(),
            "loaded grafana client certificate"
        );
        Ok(builder)
    }

    /// `{endpoint}/render/d-solo/{dashboardId}/{slug}?orgId=..&panelId=..[&from=..&to=..]`
    pub fn build_render_url(&self, request: &RenderRequest) -> String {
        let dashboard = &request.dashboard;
        let query = request
            .query_params()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}/render/d-solo/{}/{}?{}",
            self.endpoint,
            urlencoding::encode(&dashboard.dashboard_id),
            urlencoding::encode(&dashboard.dashboard_slug),
            query
        )
    }
}

/// DER encodings of the CA certificates carried alongside the client key.
fn bundled_ca_certificates(der: &[u8], password: &str) -> Result<Vec<Vec<u8>>, ErrorStack> {
    let parsed = Pkcs12::from_der(der)?.parse2(password)?;
    parsed
        .ca
        .map(|stack| stack.iter().map(|ca| ca.to_der()).collect())
        .unwrap_or_else(|| Ok(Vec::new()))
}

#[async_trait]
impl PanelRenderer for GrafanaClient {
    async fn fetch_solo_panel(&self, request: &RenderRequest) -> AppResult<RenderResult> {
        let url = self.build_render_url(request);
        tracing::debug!(dashboard = %request.dashboard.name, %url, "requesting solo panel");

        let mut http_request = self.client.get(&url);
        if let Some((name, value)) = &self.auth_header {
            http_request = http_request.header(name.clone(), value.clone());
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| AppError::Render(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Render(format!(
                "grafana returned {} for {}: {}",
                status, url, body
            )));
        }

        let source_url = response.url().to_string();
        let image = response
            .bytes()
            .await
            .map_err(|e| AppError::Render(format!("failed to read body from {}: {}", url, e)))?;

        Ok(RenderResult { image, source_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::Dashboard;
    use crate::domain::render::RenderOptions;
    use openssl::asn1::Asn1Time;
    use openssl::hash::MessageDigest;
    use openssl::pkey::{PKey, Private};
    use openssl::rsa::Rsa;
    use openssl::stack::Stack;
    use openssl::x509::extension::BasicConstraints;
    use openssl::x509::{X509, X509NameBuilder};
    use std::io::Write;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dashboard() -> Dashboard {
        Dashboard::new(
            "cpu-usage".to_string(),
            "abc123".to_string(),
            "node-exporter".to_string(),
            "1".to_string(),
            "4".to_string(),
        )
    }

    fn client(endpoint: &str) -> GrafanaClient {
        GrafanaClient::new(endpoint.to_string(), RenderAuth::None).unwrap()
    }

    #[test]
    fn test_build_render_url() {
        let client = client("http://grafana.local:3000/");
        let request = RenderRequest::new(dashboard(), RenderOptions::since("now-2h".to_string()));

        assert_eq!(
            client.build_render_url(&request),
            "http://grafana.local:3000/render/d-solo/abc123/node-exporter?orgId=1&panelId=4&from=now-2h&to=now"
        );
    }

    #[test]
    fn test_build_render_url_keeps_base_path() {
        let client = client("https://example.com/grafana");
        let request = RenderRequest::new(dashboard(), RenderOptions::default());

        assert_eq!(
            client.build_render_url(&request),
            "https://example.com/grafana/render/d-solo/abc123/node-exporter?orgId=1&panelId=4"
        );
    }

    #[test]
    fn test_build_render_url_is_deterministic() {
        let client = client("http://grafana.local");
        let request = RenderRequest::new(dashboard(), RenderOptions::since("now-7d".to_string()));

        let first = client.build_render_url(&request);
        let second = client.build_render_url(&request.clone());
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_render_url_encodes_values() {
        let client = client("http://grafana.local");
        let mut dashboard = dashboard();
        dashboard.dashboard_slug = "cpu usage/host".to_string();
        let request = RenderRequest::new(dashboard, RenderOptions::default());

        assert_eq!(
            client.build_render_url(&request),
            "http://grafana.local/render/d-solo/abc123/cpu%20usage%2Fhost?orgId=1&panelId=4"
        );
    }

    #[tokio::test]
    async fn test_fetch_solo_panel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/render/d-solo/abc123/node-exporter"))
            .and(query_param("orgId", "1"))
            .and(query_param("panelId", "4"))
            .and(query_param("from", "now-2h"))
            .and(query_param("to", "now"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(b"\x89PNG\r\n".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let request = RenderRequest::new(dashboard(), RenderOptions::since("now-2h".to_string()));
        let result = client.fetch_solo_panel(&request).await.unwrap();

        assert_eq!(result.image.as_ref(), b"\x89PNG\r\n");
        assert_eq!(result.source_url, client.build_render_url(&request));
    }

    #[tokio::test]
    async fn test_fetch_sends_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("X-WEBAUTH-USER", "graph-bot"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let auth = RenderAuth::Header {
            name: "X-WEBAUTH-USER".to_string(),
            value: SecretString::from("graph-bot".to_string()),
        };
        let client = GrafanaClient::new(server.uri(), auth).unwrap();
        let request = RenderRequest::new(dashboard(), RenderOptions::default());

        assert!(client.fetch_solo_panel(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_error_status_is_render_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("renderer crashed"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let request = RenderRequest::new(dashboard(), RenderOptions::default());
        let err = client.fetch_solo_panel(&request).await.unwrap_err();

        match err {
            AppError::Render(message) => assert!(message.contains("500")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_error_is_render_error() {
        let client = client("http://127.0.0.1:1");
        let request = RenderRequest::new(dashboard(), RenderOptions::default());

        let err = client.fetch_solo_panel(&request).await.unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let auth = RenderAuth::Header {
            name: "bad header".to_string(),
            value: SecretString::from("x".to_string()),
        };
        let result = GrafanaClient::new("http://grafana.local".to_string(), auth);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_bundle_is_credential_error() {
        let auth = RenderAuth::Certificate(ClientCertificate {
            p12_path: PathBuf::from("/nonexistent/client.p12"),
            password: SecretString::from(String::new()),
            ca_bundle: None,
        });
        let result = GrafanaClient::new("https://grafana.local".to_string(), auth);
        assert!(matches!(result, Err(AppError::Credential(_))));
    }

    #[test]
    fn test_malformed_bundle_is_credential_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not pkcs12").unwrap();

        let auth = RenderAuth::Certificate(ClientCertificate {
            p12_path: file.path().to_path_buf(),
            password: SecretString::from("secret".to_string()),
            ca_bundle: None,
        });
        let result = GrafanaClient::new("https://grafana.local".to_string(), auth);
        assert!(matches!(result, Err(AppError::Credential(_))));
    }

    fn key() -> PKey<Private> {
        PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
    }

    fn certificate(
        common_name: &str,
        key: &PKey<Private>,
        issuer: Option<(&X509, &PKey<Private>)>,
    ) -> X509 {
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", common_name).unwrap();
        let name = name.build();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder.set_subject_name(&name).unwrap();
        match issuer {
            Some((ca, _)) => builder.set_issuer_name(ca.subject_name()).unwrap(),
            None => builder.set_issuer_name(&name).unwrap(),
        }
        builder.set_pubkey(key).unwrap();
        builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
        builder.set_not_after(&Asn1Time::days_from_now(30).unwrap()).unwrap();
        if issuer.is_none() {
            builder
                .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
                .unwrap();
        }
        let signing_key = issuer.map(|(_, ca_key)| ca_key).unwrap_or(key);
        builder.sign(signing_key, MessageDigest::sha256()).unwrap();
        builder.build()
    }

    /// Client key and certificate issued by a private CA, with the CA in the chain.
    fn bundle_with_ca(password: &str) -> (Vec<u8>, X509) {
        let ca_key = key();
        let ca = certificate("graph test ca", &ca_key, None);
        let client_key = key();
        let client_cert = certificate("graph-bot", &client_key, Some((&ca, &ca_key)));

        let mut chain = Stack::new().unwrap();
        chain.push(ca.clone()).unwrap();
        let p12 = Pkcs12::builder()
            .name("graph-bot")
            .pkey(&client_key)
            .cert(&client_cert)
            .ca(chain)
            .build2(password)
            .unwrap();
        (p12.to_der().unwrap(), ca)
    }

    #[test]
    fn test_bundled_ca_certificates() {
        let (der, ca) = bundle_with_ca("hunter2");

        let roots = bundled_ca_certificates(&der, "hunter2").unwrap();
        assert_eq!(roots, vec![ca.to_der().unwrap()]);

        assert!(bundled_ca_certificates(&der, "wrong").is_err());
    }

    #[test]
    fn test_client_certificate_with_bundled_ca() {
        let (der, _) = bundle_with_ca("hunter2");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&der).unwrap();

        let auth = RenderAuth::Certificate(ClientCertificate {
            p12_path: file.path().to_path_buf(),
            password: SecretString::from("hunter2".to_string()),
            ca_bundle: None,
        });
        assert!(GrafanaClient::new("https://grafana.local".to_string(), auth).is_ok());
    }

    #[test]
    fn test_wrong_bundle_password_is_credential_error() {
        let (der, _) = bundle_with_ca("hunter2");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&der).unwrap();

        let auth = RenderAuth::Certificate(ClientCertificate {
            p12_path: file.path().to_path_buf(),
            password: SecretString::from("wrong".to_string()),
            ca_bundle: None,
        });
        let result = GrafanaClient::new("https://grafana.local".to_string(), auth);
        assert!(matches!(result, Err(AppError::Credential(_))));
    }
}
