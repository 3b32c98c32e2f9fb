//! Redirect and HSTS configuration for two web-server families.
//!
//! Apache (`.htaccess`) and nginx (`nginx.conf`) renderings of the same
//! truth table. The shared [`RedirectPolicy`] is the single place the
//! https/force-host decisions are made, so the two renderers cannot drift
//! apart on what is being forced.

use crate::options::RunConfig;
use std::fs;
use std::io;
use std::path::Path;

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains; preload";

/// The decisions both config renderers consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPolicy {
    https: bool,
    force_host: bool,
    host: Option<String>,
}

impl RedirectPolicy {
    pub fn from_config(cfg: &RunConfig) -> Self {
        Self {
            https: cfg.https,
            force_host: cfg.force_host,
            host: if cfg.host.is_empty() {
                None
            } else {
                Some(cfg.host.clone())
            },
        }
    }

    /// Is an HTTP → HTTPS upgrade (and HSTS) emitted?
    pub fn https_forced(&self) -> bool {
        self.https
    }

    /// Is a host-canonicalization redirect emitted?
    pub fn host_forced(&self) -> bool {
        self.force_host && self.host.is_some()
    }

    fn scheme(&self) -> &'static str {
        if self.https { "https" } else { "http" }
    }
}

pub fn render_htaccess(policy: &RedirectPolicy) -> String {
    let mut lines = vec!["RewriteEngine On".to_string()];

    if policy.https_forced() {
        lines.push("<IfModule mod_headers.c>".to_string());
        lines.push(format!(
            "Header always set Strict-Transport-Security \"{HSTS_VALUE}\""
        ));
        lines.push("</IfModule>".to_string());

        let target_host = match (&policy.host, policy.force_host) {
            (Some(host), true) => host.clone(),
            _ => "%{HTTP_HOST}".to_string(),
        };
        lines.push("RewriteCond %{HTTPS} !=on".to_string());
        lines.push(format!(
            "RewriteRule ^ https://{target_host}%{{REQUEST_URI}} [L,R=301]"
        ));
    }

    if policy.host_forced() {
        let host = policy.host.as_deref().unwrap_or_default();
        lines.push(format!(
            "RewriteCond %{{HTTP_HOST}} !^{}$ [NC]",
            regex::escape(host)
        ));
        lines.push(format!(
            "RewriteRule ^ {}://{host}%{{REQUEST_URI}} [L,R=301]",
            policy.scheme()
        ));
    }

    format!("# Canonical redirects\n{}\n", lines.join("\n"))
}

pub fn render_nginx(policy: &RedirectPolicy) -> String {
    let host = policy.host.as_deref().unwrap_or("example.com");
    let mut conf = Vec::new();

    if policy.host_forced() {
        conf.push("server {".to_string());
        conf.push("    listen 80;".to_string());
        conf.push("    server_name _;".to_string());
        conf.push(format!(
            "    return 301 {}://{host}$request_uri;",
            policy.scheme()
        ));
        conf.push("}".to_string());
    }

    conf.push("server {".to_string());
    conf.push(format!(
        "    listen {};",
        if policy.https_forced() { "443 ssl" } else { "80" }
    ));
    conf.push(format!("    server_name {host};"));
    conf.push(format!(
        "    root /var/www/{host}/public; # adjust to the deployed export path"
    ));
    conf.push("    index index.html;".to_string());

    if policy.https_forced() {
        conf.push(format!(
            "    add_header Strict-Transport-Security \"{HSTS_VALUE}\" always;"
        ));
        conf.push(format!(
            "    # ssl_certificate /etc/letsencrypt/live/{host}/fullchain.pem;"
        ));
        conf.push(format!(
            "    # ssl_certificate_key /etc/letsencrypt/live/{host}/privkey.pem;"
        ));
    }

    conf.push("    location / {".to_string());
    conf.push("        try_files $uri $uri/ =404;".to_string());
    conf.push("    }".to_string());
    conf.push("}".to_string());

    format!("{}\n", conf.join("\n"))
}

/// Write both config files at the export root.
pub fn write_all(export_dir: &Path, cfg: &RunConfig) -> io::Result<()> {
    let policy = RedirectPolicy::from_config(cfg);
    fs::write(export_dir.join(".htaccess"), render_htaccess(&policy))?;
    fs::write(export_dir.join("nginx.conf"), render_nginx(&policy))
}
