//! HTML rendering for the overlay browser source.

use handlebars::Handlebars;
use serde::Serialize;

use super::options::OverlayOptions;
use super::snapshot::OverlaySnapshot;
use super::theme::{FontSizes, OverlayColors};
use crate::error::{Result, SetlistError};

const TEMPLATE_NAME: &str = "overlay";

const OVERLAY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="UTF-8" />
<meta name="viewport" content="width={{width}}, height={{height}}, initial-scale=1" />
<meta http-equiv="refresh" content="1" />
<title>{{brand_text}} Viewer</title>
<style>
:root{
  --bg: rgba(0,0,0,0);
  --card: {{colors.card}};
  --card2: {{colors.card2}};
  --text: {{colors.text}};
  --muted: {{colors.muted}};
  --accent: {{colors.accent}};
  --border: {{colors.border}};
  --shadow: {{colors.shadow}};
  --radius: 14px;
  --w: {{width}}px;
  --h: {{height}}px;
  --title: {{fonts.title}}px;
  --timer: {{fonts.timer}}px;
  --meta: {{fonts.meta}}px;
  --section: {{fonts.section}}px;
  --list: {{fonts.list}}px;
  --footer: {{fonts.footer}}px;
}
html, body{
  margin: 0; padding: 0;
  width: var(--w); height: var(--h);
  overflow: hidden;
  background: var(--bg);
  color: var(--text);
  font-family: "Yu Gothic UI","Meiryo",system-ui,-apple-system,sans-serif;
}
.wrapper{ width: var(--w); height: var(--h); padding: 18px; box-sizing: border-box; }
.card{
  height: 100%;
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  box-shadow: 0 10px 30px var(--shadow);
  padding: 14px 16px;
  box-sizing: border-box;
  backdrop-filter: blur(6px);
  display: flex; flex-direction: column;
}
.h{ display: flex; justify-content: space-between; align-items: baseline; gap: 12px; }
.nowTitle{
  font-size: var(--title); font-weight: 800; line-height: 1.1;
  text-shadow: 0 2px 12px rgba(0,0,0,.25);
  flex: 1 1 auto; overflow: hidden; white-space: nowrap; text-overflow: ellipsis;
}
.timer{
  font-size: var(--timer); font-weight: 800; color: var(--accent);
  text-shadow: 0 2px 12px rgba(0,0,0,.25);
  flex: 0 0 auto;
}
.meta{
  margin-top: 8px; padding: 8px 10px; border-radius: 12px;
  background: var(--card2); border: 1px solid var(--border);
  font-size: var(--meta); color: var(--muted);
  min-height: calc(var(--meta) * 1.6);
}
.row{
  margin-top: 12px; flex: 1 1 auto;
  display: grid; grid-template-columns: 1fr 1fr; gap: 12px;
  min-height: 0;
}
.col{
  background: var(--card2); border: 1px solid var(--border); border-radius: 12px;
  padding: 10px; box-sizing: border-box;
  display: flex; flex-direction: column; min-height: 0;
}
.sectionTitle{ font-size: var(--section); font-weight: 900; letter-spacing: .04em; margin-bottom: 8px; }
.list{ flex: 1 1 auto; min-height: 0; overflow: hidden; font-size: var(--list); line-height: 1.35; }
.list > div{
  white-space: nowrap; overflow: hidden; text-overflow: ellipsis;
  padding: 3px 0; border-bottom: 1px solid rgba(255,255,255,.10);
}
.list > div:last-child{ border-bottom: none; }
.footer{
  margin-top: 10px; display: flex; justify-content: space-between; align-items: center;
  font-size: var(--footer); color: var(--muted); opacity: .95;
}
.dt, .brand{ white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
.brand{ font-weight: 800; }
</style>
</head>
<body>
  <div class="wrapper">
    <div class="card">
      <div class="h">
        <div class="nowTitle">{{now_title}}</div>
        <div class="timer">{{timer_text}}</div>
      </div>

      <div class="meta">{{#if now_provider}}音源: {{now_provider}} 様{{else}}音源: &nbsp;{{/if}}</div>

      <div class="row">
        <div class="col">
          <div class="sectionTitle">Queue</div>
          <div class="list">{{#each queue_lines}}<div>{{this}}</div>{{else}}<div>—</div>{{/each}}</div>
        </div>
        <div class="col">
          <div class="sectionTitle">Done</div>
          <div class="list">{{#each done_lines}}<div>{{this}}</div>{{else}}<div>—</div>{{/each}}</div>
        </div>
      </div>

      <div class="footer">
        <div class="dt">{{#if show_dt}}{{updated_at}}{{else}}&nbsp;{{/if}}</div>
        <div class="brand">{{#if show_brand}}{{brand_text}}{{else}}&nbsp;{{/if}}</div>
      </div>
    </div>
  </div>
</body>
</html>
"#;

#[derive(Serialize)]
struct TemplateData<'a> {
    width: u32,
    height: u32,
    colors: OverlayColors,
    fonts: FontSizes,
    now_title: &'a str,
    now_provider: &'a str,
    timer_text: &'a str,
    queue_lines: &'a [String],
    done_lines: &'a [String],
    show_dt: bool,
    updated_at: &'a str,
    show_brand: bool,
    brand_text: &'a str,
}

/// Holds the compiled overlay template.
pub struct OverlayRenderer {
    registry: Handlebars<'static>,
}

impl OverlayRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry
            .register_template_string(TEMPLATE_NAME, OVERLAY_TEMPLATE)
            .map_err(|e| SetlistError::Render(e.to_string()))?;
        Ok(Self { registry })
    }

    pub fn render(&self, snapshot: &OverlaySnapshot, options: &OverlayOptions) -> Result<String> {
        let data = TemplateData {
            width: options.width,
            height: options.height,
            colors: options.colors(),
            fonts: options.font_sizes(),
            now_title: &snapshot.now_title,
            now_provider: &snapshot.now_provider,
            timer_text: &snapshot.timer_text,
            queue_lines: &snapshot.queue_lines,
            done_lines: &snapshot.done_lines,
            show_dt: snapshot.show_timestamp && !snapshot.updated_at.is_empty(),
            updated_at: &snapshot.updated_at,
            show_brand: snapshot.show_brand,
            brand_text: &snapshot.brand_text,
        };

        self.registry
            .render(TEMPLATE_NAME, &data)
            .map_err(|e| SetlistError::Render(e.to_string()))
    }
}

impl std::fmt::Debug for OverlayRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRenderer").finish_non_exhaustive()
    }
}

/// One-off render. Long-lived callers should keep an [`OverlayRenderer`].
pub fn render_overlay(snapshot: &OverlaySnapshot, options: &OverlayOptions) -> Result<String> {
    OverlayRenderer::new()?.render(snapshot, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::theme::Palette;

    fn snapshot() -> OverlaySnapshot {
        OverlaySnapshot {
            now_title: "Song <A> & Co".to_string(),
            now_provider: "Label".to_string(),
            timer_text: "00:12:34".to_string(),
            queue_lines: vec!["Next - Z".to_string()],
            done_lines: Vec::new(),
            updated_at: "2024-05-01 12:00:00".to_string(),
            show_timestamp: true,
            show_brand: true,
            brand_text: "Roent.List".to_string(),
        }
    }

    #[test]
    fn test_document_is_self_contained() {
        let html = render_overlay(&snapshot(), &OverlayOptions::default()).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<meta http-equiv="refresh" content="1" />"#));
        assert!(html.contains("<style>"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("stylesheet"));
        assert!(html.contains("--w: 800px;"));
        assert!(html.contains("--title: 39px;"));
        assert!(html.contains("--card: rgba(223,243,255,0.82);"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_overlay(&snapshot(), &OverlayOptions::default()).unwrap();
        assert!(html.contains("Song &lt;A&gt; &amp; Co"));
        assert!(!html.contains("Song <A>"));
    }

    #[test]
    fn test_provider_and_placeholders() {
        let html = render_overlay(&snapshot(), &OverlayOptions::default()).unwrap();
        assert!(html.contains("音源: Label 様"));
        assert!(html.contains("<div>Next - Z</div>"));
        assert!(html.contains("<div>—</div>"));
        assert!(html.contains(r#"<div class="dt">2024-05-01 12:00:00</div>"#));
        assert!(html.contains(r#"<div class="brand">Roent.List</div>"#));
    }

    #[test]
    fn test_hidden_footer_items() {
        let mut snap = snapshot();
        snap.show_timestamp = false;
        snap.show_brand = false;
        snap.now_provider.clear();

        let html = render_overlay(&snap, &OverlayOptions::default()).unwrap();

        assert!(html.contains(r#"<div class="dt">&nbsp;</div>"#));
        assert!(html.contains(r#"<div class="brand">&nbsp;</div>"#));
        assert!(html.contains("音源: &nbsp;"));
        assert!(!html.contains("2024-05-01"));
    }

    #[test]
    fn test_theme_and_size_flow_into_css() {
        let options = OverlayOptions {
            width: 1280,
            height: 720,
            palette: Palette::resolve("dark"),
            ..Default::default()
        };
        let html = render_overlay(&snapshot(), &options).unwrap();
        assert!(html.contains("--h: 720px;"));
        assert!(html.contains("--card: rgba(20,20,24,.72);"));
        assert!(html.contains(r#"content="width=1280, height=720, initial-scale=1""#));
    }
}
