//! RSS 2.0 / Atom 1.0 parsing into [`ParsedFeed`].
//!
//! Only the fields the pipeline reads are mapped; everything else in the
//! document is ignored. The root element decides the dialect.

use anyhow::{anyhow, Context, Result};
use quick_xml::{
    de::from_str,
    events::{BytesStart, BytesText, Event},
    Reader, Writer,
};
use serde::Deserialize;

use crate::ingest::types::{FeedEntry, ParsedFeed};

// --- RSS 2.0 ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

// --- Atom 1.0 ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<AtomText>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

/// Text construct (`<title type="html">…</title>`). `type="xhtml"` bodies are
/// flattened to plain text before deserializing.
#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    /// `rel="alternate"` (or no rel) wins; otherwise the first link.
    fn primary_link(&self) -> Option<String> {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.links.first())
            .map(|l| l.href.clone())
    }
}

/// Parse a feed document. Errors on malformed XML or an unknown root element.
pub fn parse_feed(xml: &str) -> Result<ParsedFeed> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    match root_element(&xml_clean).as_deref() {
        Some("rss") => parse_rss(&xml_clean),
        Some("feed") => parse_atom(&xml_clean),
        Some(other) => Err(anyhow!("unsupported feed root element <{other}>")),
        None => Err(anyhow!("no root element found in feed document")),
    }
}

fn parse_rss(xml: &str) -> Result<ParsedFeed> {
    let rss: Rss = from_str(xml).context("parsing rss xml")?;
    let entries = rss
        .channel
        .items
        .into_iter()
        .map(|it| FeedEntry {
            title: it.title,
            summary: it.description,
            link: it.link,
            published: it.pub_date,
            updated: None,
        })
        .collect();

    Ok(ParsedFeed {
        title: rss.channel.title,
        entries,
    })
}

fn parse_atom(xml: &str) -> Result<ParsedFeed> {
    let xml = flatten_xhtml_text(xml)?;
    let feed: AtomFeed = from_str(&xml).context("parsing atom xml")?;
    let entries = feed
        .entries
        .into_iter()
        .map(|e| {
            let link = e.primary_link();
            FeedEntry {
                title: e.title.map(|t| t.value),
                summary: e.summary.or(e.content).map(|t| t.value),
                link,
                published: e.published,
                updated: e.updated,
            }
        })
        .collect();

    Ok(ParsedFeed {
        title: feed.title.map(|t| t.value),
        entries,
    })
}

/// Local name of the first element in the document.
fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

fn is_xhtml_construct(e: &BytesStart<'_>) -> bool {
    matches!(e.try_get_attribute("type"), Ok(Some(a)) if a.value.as_ref() == b"xhtml")
}

/// Replace the markup inside every `type="xhtml"` element with its text
/// content, whitespace collapsed. Other events pass through untouched.
fn flatten_xhtml_text(xml: &str) -> Result<String> {
    if !xml.contains("xhtml") {
        return Ok(xml.to_string());
    }
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    // Nesting depth below the current xhtml construct; 0 when outside one.
    let mut depth = 0usize;
    let mut text = String::new();

    loop {
        let event = reader.read_event().context("scanning atom xml")?;
        match event {
            Event::Eof => break,
            Event::Start(e) if depth == 0 && is_xhtml_construct(&e) => {
                writer.write_event(Event::Start(e))?;
                depth = 1;
                text.clear();
            }
            Event::Start(_) if depth > 0 => depth += 1,
            Event::End(e) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    writer.write_event(Event::Text(BytesText::new(&flat)))?;
                    writer.write_event(Event::End(e))?;
                }
            }
            Event::Text(t) if depth > 0 => {
                text.push_str(&t.unescape().context("decoding xhtml text")?);
                text.push(' ');
            }
            Event::CData(c) if depth > 0 => {
                text.push_str(&String::from_utf8_lossy(&c));
                text.push(' ');
            }
            _ if depth > 0 => {}
            other => writer.write_event(other)?,
        }
    }
    String::from_utf8(writer.into_inner()).context("atom xml is not utf-8")
}

/// Entities folded to plain ASCII instead of their Unicode character.
const ASCII_FOLDS: &[(&str, &str)] = &[
    ("nbsp", " "),
    ("ndash", "-"),
    ("mdash", "-"),
    ("ldquo", "\""),
    ("rdquo", "\""),
    ("lsquo", "'"),
    ("rsquo", "'"),
    ("hellip", "..."),
];

/// The only named entities XML itself defines.
const XML_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "apos"];

/// `name` of an `&name;` reference at the start of `tail`, if there is one.
fn entity_name(tail: &str) -> Option<&str> {
    let body = tail.strip_prefix('&')?;
    let end = body.find(';')?;
    let name = &body[..end];
    (!name.is_empty() && name.len() <= 32 && name.bytes().all(|b| b.is_ascii_alphanumeric()))
        .then_some(name)
}

/// Rewrite HTML named entities, which XML does not define, into text XML accepts.
/// Known ones become their character (re-escaped if it is markup); unknown
/// ones are kept literally as `&amp;name;`.
fn scrub_html_entities_for_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let Some(name) = entity_name(tail).filter(|n| !XML_ENTITIES.contains(n)) else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };
        let token = &tail[..name.len() + 2];
        if let Some((_, ascii)) = ASCII_FOLDS.iter().find(|(n, _)| *n == name) {
            out.push_str(ascii);
        } else {
            let decoded = html_escape::decode_html_entities(token);
            if decoded.as_ref() == token {
                out.push_str("&amp;");
                out.push_str(&token[1..]);
            } else {
                out.push_str(&html_escape::encode_text(decoded.as_ref()));
            }
        }
        rest = &tail[token.len()..];
    }
    out.push_str(rest);
    out
}
