//! RSS parsing and HTML stripping for news search feeds.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::PipelineError;
use crate::types::RawArticle;

/// Parse an RSS XML feed into [`RawArticle`]s, in feed order.
///
/// Extracts `<title>`, `<link>`, `<description>` (HTML stripped), `<pubDate>`,
/// `<source>` as the media name and `<media:content url=..>` as the image.
/// Items without a title or link are skipped.
pub(crate) fn parse_news_feed(xml: &str) -> Result<Vec<RawArticle>, PipelineError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut articles = Vec::new();
    let mut in_item = false;
    let mut current_tag = String::new();
    let mut item = ItemFields::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = tag_name(&e);
                if name == "item" {
                    in_item = true;
                    item = ItemFields::default();
                } else if in_item && name == "media:content" {
                    item.take_image(&e);
                }
                current_tag = name;
            }
            Ok(Event::Empty(e)) => {
                if in_item && tag_name(&e) == "media:content" {
                    item.take_image(&e);
                }
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" && in_item {
                    in_item = false;
                    if let Some(article) = std::mem::take(&mut item).into_article() {
                        articles.push(article);
                    }
                }
                if name == current_tag {
                    current_tag.clear();
                }
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    item.push_text(&current_tag, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    item.push_text(&current_tag, &text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PipelineError::Xml(e)),
            _ => {}
        }
    }

    Ok(articles)
}

fn tag_name(e: &BytesStart<'_>) -> String {
    std::str::from_utf8(e.name().as_ref())
        .unwrap_or("")
        .to_string()
}

#[derive(Debug, Default)]
struct ItemFields {
    title: String,
    link: String,
    description: String,
    pub_date: String,
    source: String,
    image: Option<String>,
}

impl ItemFields {
    fn push_text(&mut self, tag: &str, text: &str) {
        let field = match tag {
            "title" => &mut self.title,
            "link" => &mut self.link,
            "description" => &mut self.description,
            "pubDate" => &mut self.pub_date,
            "source" => &mut self.source,
            _ => return,
        };
        field.push_str(text);
    }

    fn take_image(&mut self, e: &BytesStart<'_>) {
        if self.image.is_some() {
            return;
        }
        if let Ok(Some(attr)) = e.try_get_attribute("url") {
            if let Ok(url) = attr.unescape_value() {
                if !url.is_empty() {
                    self.image = Some(url.into_owned());
                }
            }
        }
    }

    fn into_article(self) -> Option<RawArticle> {
        let title = self.title.trim();
        let link = self.link.trim();
        if title.is_empty() || link.is_empty() {
            return None;
        }

        let media = self.source.trim().to_string();
        Some(RawArticle {
            title: strip_media_suffix(title, &media).to_string(),
            description: strip_html(&self.description),
            link: link.to_string(),
            image: self.image,
            published_at: parse_pub_date(&self.pub_date),
            media,
        })
    }
}

/// Google News titles read `Headline - Publisher`; drop the publisher part.
fn strip_media_suffix<'a>(title: &'a str, media: &str) -> &'a str {
    if media.is_empty() {
        return title;
    }
    title
        .strip_suffix(media)
        .and_then(|rest| rest.strip_suffix(" - "))
        .map_or(title, str::trim_end)
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Strip HTML tags and decode entities, then normalize whitespace.
pub(crate) fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    decode_entities(&out)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode character references and common HTML entities. Text with a stray
/// `&` or an unknown entity is returned as-is.
fn decode_entities(text: &str) -> Cow<'_, str> {
    unescape_with(text, html_entity).unwrap_or(Cow::Borrowed(text))
}

fn html_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "hellip" => "\u{2026}",
        _ => return None,
    };
    Some(value)
}
