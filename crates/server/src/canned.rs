//! Pre-authored rich replies for the fixed intents. These are content, not
//! logic: the dispatcher hands them back without touching the core.

use serde::Serialize;

use storebot_core::config::StoreConfig;

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum FulfillmentMessage {
    Text { text: TextBlock },
    Payload { payload: RichPayload },
}

impl FulfillmentMessage {
    pub fn text(line: impl Into<String>) -> Self {
        Self::Text { text: TextBlock { text: vec![line.into()] } }
    }

    pub fn rich(rows: Vec<Vec<RichElement>>) -> Self {
        Self::Payload { payload: RichPayload { rich_content: rows } }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TextBlock {
    pub text: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RichPayload {
    #[serde(rename = "richContent")]
    pub rich_content: Vec<Vec<RichElement>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RichElement {
    #[serde(rename_all = "camelCase")]
    Image { raw_url: String, accessibility_text: String },
    #[serde(rename_all = "camelCase")]
    Info { title: String, subtitle: String, action_link: String },
    Button { text: String, link: String, icon: Icon },
}

#[derive(Clone, Debug, Serialize)]
pub struct Icon {
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
}

impl RichElement {
    pub fn image(raw_url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::Image { raw_url: raw_url.into(), accessibility_text: alt.into() }
    }

    pub fn info(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        action_link: impl Into<String>,
    ) -> Self {
        Self::Info { title: title.into(), subtitle: subtitle.into(), action_link: action_link.into() }
    }

    pub fn button(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self::Button {
            text: text.into(),
            link: link.into(),
            icon: Icon { kind: "chevron_right".to_string(), color: "#4285F4".to_string() },
        }
    }
}

pub fn about_website(store: &StoreConfig) -> Vec<FulfillmentMessage> {
    vec![
        FulfillmentMessage::text(format!(
            "{name} is an online shoe store with a wide range of stylish footwear \
             across all the big brands.\n\n\
             Sneakers, loafers and slides are all available with cash on delivery \
             and free shipping.\n\nVisit us at {site}",
            name = store.name,
            site = store.site_url,
        )),
        FulfillmentMessage::rich(vec![vec![RichElement::button(
            "Visit Website",
            store.site_url.clone(),
        )]]),
    ]
}

pub fn sale(store: &StoreConfig) -> Vec<FulfillmentMessage> {
    let link = format!("{}/collections/sale", store.site_url);
    vec![FulfillmentMessage::rich(vec![
        vec![
            RichElement::image(
                format!("{}/cdn/showcase/sale-runner.png", store.site_url),
                "Gel cushioned running shoes on sale",
            ),
            RichElement::info(
                "Gel Keyano 30 Grey",
                "Gel cushioning, breathable mesh uppers and all-day comfort, now on sale.",
                link.clone(),
            ),
        ],
        vec![
            RichElement::image(
                format!("{}/cdn/showcase/sale-court.png", store.site_url),
                "Courtside sneakers on sale",
            ),
            RichElement::info(
                "Courtside 23 Grey Fog",
                "Effortless everyday style with a cushioned midsole, reduced this week.",
                link,
            ),
        ],
    ])]
}

pub fn trending(store: &StoreConfig) -> Vec<FulfillmentMessage> {
    let link = format!("{}/collections/trending", store.site_url);
    vec![FulfillmentMessage::rich(vec![
        vec![
            RichElement::image(
                format!("{}/cdn/showcase/trending-maxx.png", store.site_url),
                "Air Max 90 Black Red sneakers",
            ),
            RichElement::info(
                "Air Max 90 Black Red",
                "The perfect combination of performance, comfort and bold style.",
                link.clone(),
            ),
        ],
        vec![
            RichElement::image(
                format!("{}/cdn/showcase/trending-low.png", store.site_url),
                "All-white classic low sneakers",
            ),
            RichElement::info(
                "Classic Low All-White",
                "Timeless all-white sneakers crafted for unmatched everyday comfort.",
                link,
            ),
        ],
    ])]
}

pub fn new_arrivals(store: &StoreConfig) -> Vec<FulfillmentMessage> {
    let link = format!("{}/collections/new-arrivals", store.site_url);
    vec![FulfillmentMessage::rich(vec![
        vec![
            RichElement::image(
                format!("{}/cdn/showcase/new-foam.png", store.site_url),
                "Fresh foam cushioned running shoes",
            ),
            RichElement::info(
                "Fresh Foam X More Trail V3",
                "Premium cushioned running shoes with breathable mesh, just landed.",
                link.clone(),
            ),
        ],
        vec![
            RichElement::image(
                format!("{}/cdn/showcase/new-slide.png", store.site_url),
                "Max cushion slides",
            ),
            RichElement::info(
                "Max Cushion Slide Black",
                "Orthopedic cloud foam and ergonomic arch support for home, gym and summer.",
                link,
            ),
        ],
    ])]
}

pub fn helpline(store: &StoreConfig) -> Vec<FulfillmentMessage> {
    let mut messages = vec![FulfillmentMessage::text(format!(
        "Our helpline number is: {}\nFeel free to call us anytime during business hours. \
         We're here to help!",
        store.helpline,
    ))];
    if let Some(whatsapp) = &store.whatsapp_link {
        messages.push(FulfillmentMessage::rich(vec![vec![RichElement::button(
            "WhatsApp",
            whatsapp.clone(),
        )]]));
    }
    messages
}
