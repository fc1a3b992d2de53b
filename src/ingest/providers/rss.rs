// src/ingest/providers/rss.rs
//! RSS 2.0 / RSS 1.0 (RDF) / Atom feed source, over HTTP or from an in-memory body.
//!
//! Feeds are read event by event rather than through serde: real feeds mix in
//! extension elements (`media:title`, `atom:link`, `dc:date`, ...) whose local
//! names collide with the core ones, and carry arbitrary HTML entities.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use std::time::Duration;

use crate::ingest::types::{FeedSource, RawEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedKind {
    Rss,
    Rdf,
    Atom,
}

/// First element of the document: (namespace prefix, lowercased local name).
fn root_element(xml: &str) -> Option<(Option<Vec<u8>>, String)> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.name();
                let prefix = name.prefix().map(|p| p.as_ref().to_vec());
                let local = String::from_utf8_lossy(name.local_name().as_ref()).to_ascii_lowercase();
                return Some((prefix, local));
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

fn detect_kind(xml: &str) -> Result<FeedKind> {
    match root_element(xml) {
        Some((_, local)) => match local.as_str() {
            "rss" => Ok(FeedKind::Rss),
            "rdf" => Ok(FeedKind::Rdf),
            "feed" => Ok(FeedKind::Atom),
            other => Err(anyhow!("unrecognized feed root element <{other}>")),
        },
        None => Err(anyhow!("body is not an XML document")),
    }
}

/// Entry child elements we keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Summary,
    Content,
    Published,
    Updated,
}

#[derive(Debug, Default)]
struct EntryBuilder {
    title: Option<String>,
    link: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    // Atom <link> elements: rel="alternate" (or no rel) wins over the first href
    alternate_href: Option<String>,
    first_href: Option<String>,
}

impl EntryBuilder {
    /// First occurrence wins; later duplicates are ignored.
    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn atom_link(&mut self, e: &BytesStart) {
        let Some(href) = attr(e, b"href") else {
            return;
        };
        let is_alternate = attr(e, b"rel").map_or(true, |r| r == "alternate");
        if is_alternate && self.alternate_href.is_none() {
            self.alternate_href = Some(href.clone());
        }
        if self.first_href.is_none() {
            self.first_href = Some(href);
        }
    }

    fn finish(self) -> RawEntry {
        RawEntry {
            title: self.title,
            link: self.link.or(self.alternate_href).or(self.first_href),
            summary: self.summary.or(self.content),
            published: self.published,
            updated: self.updated,
        }
    }
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    let a = e.try_get_attribute(key).ok().flatten()?;
    a.unescape_value_with(resolve_html5_entity)
        .ok()
        .map(|v| v.into_owned())
}

/// Elements in the feed's own vocabulary: unprefixed, or carrying the root's prefix.
fn is_core(e: &BytesStart, root_prefix: Option<&[u8]>) -> bool {
    match e.name().prefix() {
        None => true,
        Some(p) => root_prefix == Some(p.as_ref()),
    }
}

fn is_entry_start(kind: FeedKind, e: &BytesStart, root_prefix: Option<&[u8]>) -> bool {
    let wanted: &[u8] = match kind {
        FeedKind::Rss | FeedKind::Rdf => b"item",
        FeedKind::Atom => b"entry",
    };
    e.local_name().as_ref() == wanted && is_core(e, root_prefix)
}

fn field_for(kind: FeedKind, e: &BytesStart, root_prefix: Option<&[u8]>) -> Option<Field> {
    let name = e.name();
    let local = name.local_name();
    let local = local.as_ref();

    if let Some(prefix) = name.prefix() {
        match (prefix.as_ref(), local) {
            (b"dc", b"date") => return Some(Field::Updated),
            (b"content", b"encoded") => return Some(Field::Content),
            _ if !is_core(e, root_prefix) => return None,
            _ => {}
        }
    }

    match (kind, local) {
        (_, b"title") => Some(Field::Title),
        (FeedKind::Rss | FeedKind::Rdf, b"link") => Some(Field::Link),
        (FeedKind::Rss | FeedKind::Rdf, b"description") => Some(Field::Summary),
        (FeedKind::Rss | FeedKind::Rdf, b"pubDate") => Some(Field::Published),
        (FeedKind::Atom, b"summary") => Some(Field::Summary),
        (FeedKind::Atom, b"content") => Some(Field::Content),
        (FeedKind::Atom, b"published") => Some(Field::Published),
        (FeedKind::Atom, b"updated") => Some(Field::Updated),
        _ => None,
    }
}

/// Unknown entities are left as written; `normalize_text` gets another go at them.
fn text_of(t: &BytesText) -> String {
    t.unescape_with(resolve_html5_entity)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(t).into_owned())
}

fn read_entries(xml: &str, kind: FeedKind, root_prefix: Option<&[u8]>) -> Result<Vec<RawEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();

    let mut depth = 0usize;
    let mut entry: Option<(EntryBuilder, usize)> = None;
    // open field and its depth; text of nested markup (xhtml titles) is collected too
    let mut field: Option<(Field, usize)> = None;
    let mut text = String::new();

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("reading feed xml at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                depth += 1;
                if let Some((builder, entry_depth)) = &mut entry {
                    if field.is_none() && depth == *entry_depth + 1 {
                        if kind == FeedKind::Atom
                            && e.local_name().as_ref() == b"link"
                            && is_core(&e, root_prefix)
                        {
                            builder.atom_link(&e);
                        } else if let Some(f) = field_for(kind, &e, root_prefix) {
                            field = Some((f, depth));
                            text.clear();
                        }
                    }
                } else if is_entry_start(kind, &e, root_prefix) {
                    entry = Some((EntryBuilder::default(), depth));
                }
            }
            Event::Empty(e) => {
                if let Some((builder, entry_depth)) = &mut entry {
                    if field.is_none()
                        && depth == *entry_depth
                        && kind == FeedKind::Atom
                        && e.local_name().as_ref() == b"link"
                        && is_core(&e, root_prefix)
                    {
                        builder.atom_link(&e);
                    }
                }
            }
            Event::Text(t) => {
                if field.is_some() {
                    text.push_str(&text_of(&t));
                }
            }
            Event::CData(c) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                if let Some((f, field_depth)) = field {
                    if depth == field_depth {
                        if let Some((builder, _)) = &mut entry {
                            builder.set(f, std::mem::take(&mut text));
                        }
                        field = None;
                    }
                }
                if matches!(&entry, Some((_, d)) if *d == depth) {
                    if let Some((builder, _)) = entry.take() {
                        entries.push(builder.finish());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(entries)
}

/// Parse a feed document into raw entries.
pub fn parse_feed(body: &str) -> Result<Vec<RawEntry>> {
    let t0 = std::time::Instant::now();

    let kind = detect_kind(body)?;
    let root_prefix = root_element(body).and_then(|(p, _)| p);
    let entries = read_entries(body, kind, root_prefix.as_deref())
        .with_context(|| format!("parsing {kind:?} feed"))?;

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_entries_total").increment(entries.len() as u64);
    Ok(entries)
}

/// HTTP client with a hard per-request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("clean-news/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building http client")
}

pub struct RssFeedSource {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssFeedSource {
    /// In-memory body (tests, offline runs).
    pub fn from_fixture(name: impl Into<String>, body: &str) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn from_url(
        name: impl Into<String>,
        url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    async fn fetch_body(url: &str, client: &reqwest::Client) -> Result<String> {
        let resp = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                anyhow!("timed out fetching {url}")
            } else {
                anyhow!(e).context(format!("GET {url}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            bail!("http status {} from {url}", status.as_u16());
        }
        resp.text()
            .await
            .with_context(|| format!("reading body from {url}"))
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(body) => parse_feed(body),
            Mode::Http { url, client } => {
                let body = Self::fetch_body(url, client).await?;
                parse_feed(&body).with_context(|| format!("feed body from {url}"))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
