//! Example: Toggle pseudo-fullscreen on a small page
//!
//! Run with `RUST_LOG=ipf_engine=debug` to follow the mode transitions.

use ipf_dom::Document;
use ipf_engine::{Config, PageContext, PageEvent};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut doc = Document::new("https://video.example/watch");
    let body = doc.body().ok_or_else(|| anyhow::anyhow!("document has no body"))?;
    let header = doc.create_element_with("header", &[]);
    let frame = doc.create_element_with("iframe", &[("id", "player")]);
    doc.tree.append_child(body, header)?;
    doc.tree.append_child(body, frame)?;

    let config = Config::from_json(r#"{ "frame_selector": "iframe#player" }"#)?;
    let mut page = PageContext::new(doc, config);
    page.install();

    println!("IPF Engine v{}", ipf_engine::VERSION);

    let mode = page.handle_raw_message(r#"{"type":"TOGGLE_PSEUDO_FULLSCREEN"}"#);
    page.run_animation_frame();
    println!("mode: {:?}, target: {:?}", mode, page.target());
    println!("hidden: {:?}", page.hidden_elements());

    // The site swaps its player
    page.document_mut().tree.detach(frame)?;
    let fresh = page.document_mut().create_element_with("iframe", &[("id", "player")]);
    page.document_mut().tree.append_child(body, fresh)?;
    let action = page.process_mutations();
    println!("after re-render: {:?}, target: {:?}", action, page.target());

    if let Some(zone) = page.safe_zone() {
        page.handle_event(PageEvent::PointerEnter(zone));
        println!("presence: {:?}", page.presence());
    }

    let mode = page.toggle();
    println!("mode: {:?}, overlay: {:?}", mode, page.safe_zone());
    Ok(())
}
