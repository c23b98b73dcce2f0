use serde::Serialize;
use tracing::warn;

use kumaboard_domain::RenderPayload;

/// Discord rejects empty field names and values; a zero-width space renders as blank.
const BLANK: &str = "\u{200b}";

/// Discord answers 400 for an embed with more fields than this.
pub const MAX_EMBED_FIELDS: usize = 25;

#[derive(Debug, Serialize)]
pub struct MessageBody<'a> {
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    color: u32,
    timestamp: String,
    fields: Vec<EmbedField<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

fn or_blank(text: &str) -> &str {
    if text.is_empty() { BLANK } else { text }
}

/// Fields past [`MAX_EMBED_FIELDS`] are dropped with a warning so the
/// message still posts.
pub fn message_body(payload: &RenderPayload) -> MessageBody<'_> {
    if payload.fields.len() > MAX_EMBED_FIELDS {
        warn!(
            fields = payload.fields.len(),
            limit = MAX_EMBED_FIELDS,
            "Status embed exceeds Discord field limit, trailing fields dropped"
        );
    }
    let fields = payload
        .fields
        .iter()
        .take(MAX_EMBED_FIELDS)
        .map(|field| EmbedField {
            name: or_blank(&field.name),
            value: or_blank(&field.body),
            inline: false,
        })
        .collect();
    MessageBody {
        embeds: [Embed {
            title: &payload.title,
            color: payload.color.rgb(),
            timestamp: payload.timestamp.to_rfc3339(),
            fields,
        }],
    }
}
