//! Style injection
//!
//! One `<style>` element turns the marker attributes into the visual
//! transformation. Every rule is scoped under `html[data-ipf-enabled="1"]`
//! so the sheet is inert while the mode is off.

use ipf_dom::{Document, NodeId};

use crate::markers::{
    ATTR_ENABLED, ATTR_HIDDEN, ATTR_PAGE_INSIDE, ATTR_TARGET, ATTR_ZONE_INSIDE, SAFEZONE_ID,
    STYLE_ID,
};
use crate::Config;

/// Generate the stylesheet text for a configuration
pub fn stylesheet(config: &Config) -> String {
    let on = format!("html[{}=\"1\"]", ATTR_ENABLED);
    let zone = config.safe_zone_size_px;

    format!(
        r#"
{on},
{on} body {{
  overflow: hidden !important;
  margin: 0 !important;
  padding: 0 !important;
  background: black !important;
}}

{on} [{target}="1"] {{
  position: fixed !important;
  inset: 0 !important;
  width: 100vw !important;
  height: 100vh !important;
  max-width: none !important;
  max-height: none !important;
  margin: 0 !important;
  border: 0 !important;
  padding: 0 !important;
  z-index: 2147483646 !important;
  background: black !important;
  display: block !important;
  cursor: none !important;
}}

{on} [{hidden}="1"] {{
  display: none !important;
  visibility: hidden !important;
  pointer-events: none !important;
}}

{on} #{safezone} {{
  position: fixed !important;
  left: 50% !important;
  top: 50% !important;
  transform: translate(-50%, -50%) !important;
  width: {zone}px !important;
  height: {zone}px !important;
  z-index: 2147483647 !important;
  border-radius: 10px !important;
  pointer-events: auto !important;
  user-select: none !important;
  -webkit-user-select: none !important;
  cursor: none !important;
  background: rgba(255, 255, 255, 0.14) !important;
  border: 1px solid rgba(100, 100, 100, 0.35) !important;
  box-sizing: border-box;
  backdrop-filter: none !important;
}}

{on}[{zone_inside}="1"] #{safezone} {{
  background: rgba(255, 255, 255, 0) !important;
  border-color: rgba(0, 0, 0, 0) !important;
}}

{on}[{page_inside}="0"] #{safezone} {{
  display: none !important;
}}
"#,
        on = on,
        target = ATTR_TARGET,
        hidden = ATTR_HIDDEN,
        safezone = SAFEZONE_ID,
        zone = zone,
        zone_inside = ATTR_ZONE_INSIDE,
        page_inside = ATTR_PAGE_INSIDE,
    )
}

/// Install the stylesheet once; returns the `<style>` element
pub fn ensure_style(doc: &mut Document, config: &Config) -> Option<NodeId> {
    if let Some(existing) = doc.get_element_by_id(STYLE_ID) {
        return Some(existing);
    }
    let root = doc.document_element()?;

    let style = doc.create_element_with("style", &[("id", STYLE_ID)]);
    let text = doc.tree.create_text(&stylesheet(config));
    doc.tree.append_child(style, text).ok()?;
    doc.tree.append_child(root, style).ok()?;

    tracing::debug!("Injected pseudo-fullscreen stylesheet");
    Some(style)
}
