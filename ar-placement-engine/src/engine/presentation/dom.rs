use bevy::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, window};

use constants::session::{
    DOM_INSTRUCTIONS_ID, DOM_MESSAGE_ID, DOM_NOT_SUPPORTED_ID, DOM_TRACKING_PROMPT_ID,
};

use super::PresentationSignal;

/// Mirror presentation signals onto the page's overlay elements.
pub fn apply_dom_overlay(mut signals: EventReader<PresentationSignal>) {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };

    for signal in signals.read() {
        match signal {
            PresentationSignal::TrackingUnavailable => {
                set_display(&document, DOM_NOT_SUPPORTED_ID, "block");
            }
            PresentationSignal::AssetUnavailable => {
                set_display(&document, DOM_NOT_SUPPORTED_ID, "block");
                set_message(&document, signal.guidance());
            }
            PresentationSignal::SessionStart => {
                set_display(&document, DOM_NOT_SUPPORTED_ID, "none");
                set_display(&document, DOM_TRACKING_PROMPT_ID, "block");
                set_display(&document, DOM_INSTRUCTIONS_ID, "none");
            }
            PresentationSignal::FirstSurfaceFound => {
                set_display(&document, DOM_TRACKING_PROMPT_ID, "none");
                set_display(&document, DOM_INSTRUCTIONS_ID, "flex");
            }
        }
    }
}

fn set_display(document: &Document, id: &str, display: &str) {
    let Some(element) = document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };

    if let Err(e) = element.style().set_property("display", display) {
        warn!("Failed to set display on #{}: {:?}", id, e);
    }
}

fn set_message(document: &Document, text: &str) {
    if let Some(element) = document.get_element_by_id(DOM_MESSAGE_ID) {
        element.set_text_content(Some(text));
    }
}
