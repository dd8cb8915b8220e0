//! HTML rendering of the status page.

use std::time::Duration;

use serde::Serialize;
use tera::{Context as TeraContext, Tera};

use super::{format_timestamp, CheckLine, HealthView, Indicator, Panel, LOADING_TEXT, TITLE};
use crate::error::Result;

/// Registered name; the `.html` suffix turns on Tera's autoescaping.
const TEMPLATE_NAME: &str = "status.html";

/// Renders a [`HealthView`] as a self-refreshing HTML page.
///
/// The page holds no state of its own; it reloads once per poll interval
/// and shows whatever the monitor last published.
pub struct StatusPage {
    tera: Tera,
    refresh_secs: u64,
}

impl StatusPage {
    /// Create a renderer whose page reloads every `refresh` (at least 1s).
    pub fn new(refresh: Duration) -> Result<Self> {
        Self::from_source(STATUS_TEMPLATE, refresh)
    }

    pub(crate) fn from_source(source: &str, refresh: Duration) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)?;

        Ok(Self {
            tera,
            refresh_secs: refresh.as_secs().max(1),
        })
    }

    /// Seconds between page reloads.
    pub fn refresh_secs(&self) -> u64 {
        self.refresh_secs
    }

    /// Render a complete HTML document for a view.
    pub fn render(&self, view: &HealthView) -> Result<String> {
        let mut context = TeraContext::new();
        context.insert("title", TITLE);
        context.insert("refresh_secs", &self.refresh_secs);

        match view {
            HealthView::Loading => {
                context.insert("state", "loading");
                context.insert("loading_text", LOADING_TEXT);
            }
            HealthView::Error { message, cycle } => {
                context.insert("state", "error");
                context.insert("message", message);
                context.insert("cycle", cycle);
            }
            HealthView::Panels {
                liveness,
                readiness,
                cycle,
                checked_at,
            } => {
                context.insert("state", "panels");
                context.insert(
                    "panels",
                    &[PanelContext::from(liveness), PanelContext::from(readiness)],
                );
                context.insert("cycle", cycle);
                context.insert("checked_at", &format_timestamp(*checked_at));
            }
        }

        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

#[derive(Serialize)]
struct PanelContext<'a> {
    title: &'static str,
    class: &'static str,
    message: &'static str,
    uptime: Option<&'a str>,
    checks: &'a [CheckLine],
}

impl<'a> From<&'a Panel> for PanelContext<'a> {
    fn from(panel: &'a Panel) -> Self {
        Self {
            title: panel.kind.title(),
            class: match panel.indicator {
                Indicator::Positive => "success",
                Indicator::Negative => "error",
            },
            message: panel.message,
            uptime: panel.uptime.as_deref(),
            checks: &panel.checks,
        }
    }
}

const STATUS_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{{ refresh_secs }}">
<title>{{ title }}</title>
<style>
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
.panel { border: 1px solid #ddd; padding: 1rem; margin-bottom: 1rem; }
.alert { padding: .5rem; }
.success { background: #e6f4ea; }
.error { background: #fdecea; }
</style>
</head>
<body>
{% if state == "loading" %}
<div class="loading" role="progressbar">{{ loading_text }}</div>
{% elif state == "error" %}
<h1>{{ title }}</h1>
<p class="alert error" role="alert">{{ message }}</p>
{% else %}
<h1>{{ title }}</h1>
{% for panel in panels %}
<section class="panel">
<h2>{{ panel.title }}</h2>
<p class="alert {{ panel.class }}">{{ panel.message }}</p>
{% if panel.uptime %}<p class="uptime">Uptime: {{ panel.uptime }}</p>{% endif %}
{% if panel.checks %}<ul class="checks">
{% for check in panel.checks %}<li><strong>{{ check.name }}</strong>: {{ check.status }}{% if check.message %} ({{ check.message }}){% endif %}</li>
{% endfor %}</ul>{% endif %}
</section>
{% endfor %}
<footer>cycle {{ cycle }} &middot; checked {{ checked_at }}</footer>
{% endif %}
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MonitorError, ProbeError};
    use crate::monitor::Snapshot;
    use crate::probe::{CheckStatus, ProbeKind, ProbeResponse};

    fn page() -> StatusPage {
        StatusPage::new(Duration::from_secs(30)).unwrap()
    }

    #[test]
    fn loading_page_has_no_panels() {
        let html = page().render(&HealthView::Loading).unwrap();

        assert!(html.contains(r#"role="progressbar">Loading...</div>"#));
        assert!(!html.contains("<section"));
        assert!(!html.contains("<h1>"));
    }

    #[test]
    fn error_page_shows_one_notice() {
        let failed = Snapshot::from_outcomes(
            3,
            Err(ProbeError::HttpStatus {
                kind: ProbeKind::Readiness,
                status: 503,
            }),
            Ok(ProbeResponse::with_status("UP")),
        );
        let html = page().render(&HealthView::from_state(Some(&failed))).unwrap();

        assert!(html.contains(r#"role="alert">Failed to fetch health status</p>"#));
        assert!(!html.contains("<section"));
    }

    #[test]
    fn panels_escape_backend_text() {
        let mut readiness = ProbeResponse::with_status("DOWN");
        readiness.checks.insert(
            "<db>".to_string(),
            CheckStatus {
                status: "DOWN".to_string(),
                message: Some("x < y".to_string()),
            },
        );
        let mut liveness = ProbeResponse::with_status("UP");
        liveness.uptime = Some("<1m>".to_string());
        let snapshot = Snapshot::from_outcomes(1, Ok(liveness), Ok(readiness));
        let html = page().render(&HealthView::from_state(Some(&snapshot))).unwrap();

        assert!(html.contains("<strong>&lt;db&gt;</strong>: DOWN (x &lt; y)"));
        assert!(html.contains("Uptime: &lt;1m&gt;"));
        assert!(html.contains(r#"class="alert success">System is live"#));
        assert!(html.contains(r#"class="alert error">System is not ready"#));
        assert!(!html.contains("<db>"));
    }

    #[test]
    fn refresh_follows_the_poll_interval() {
        let page = StatusPage::new(Duration::from_secs(5)).unwrap();
        let html = page.render(&HealthView::Loading).unwrap();

        assert_eq!(page.refresh_secs(), 5);
        assert!(html.contains(r#"<meta http-equiv="refresh" content="5">"#));

        let floored = StatusPage::new(Duration::from_millis(200)).unwrap();
        assert_eq!(floored.refresh_secs(), 1);
    }

    #[test]
    fn render_failure_is_a_template_error() {
        let page = StatusPage::from_source("{{ missing.field }}", Duration::from_secs(30)).unwrap();

        let err = page.render(&HealthView::Loading).unwrap_err();
        assert!(matches!(err, MonitorError::Template(_)));
    }
}
