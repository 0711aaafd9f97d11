// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-record rendering of label values, lines and the endpoint.
//!
//! [`SimpleLayout`] understands `${renderer:option=value}` templates:
//!
//! | renderer           | output                                        |
//! |--------------------|-----------------------------------------------|
//! | `level`            | record level                                  |
//! | `logger`           | logger name                                   |
//! | `message`          | formatted message                             |
//! | `machinename`      | host name                                     |
//! | `date`, `longdate` | record time, ISO-8601 UTC                     |
//! | `exception`        | `format=type`, `format=message` or `tostring` |
//! | `event-properties` | property named by `item=`                     |
//!
//! `lowercase=true` and `uppercase=true` apply to any renderer. Unknown
//! renderers render as an empty string.

use std::sync::Arc;

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use crate::hostname::get_hostname;
use crate::record::LogRecord;

pub trait Layout: Send + Sync {
    fn render(&self, record: &LogRecord) -> String;
}

pub type SharedLayout = Arc<dyn Layout>;

impl<T: Layout + ?Sized> Layout for Arc<T> {
    fn render(&self, record: &LogRecord) -> String {
        (**self).render(record)
    }
}

/// Fixed text, identical for every record.
#[derive(Debug, Clone)]
pub struct LiteralLayout(pub String);

impl Layout for LiteralLayout {
    fn render(&self, _record: &LogRecord) -> String {
        self.0.clone()
    }
}

/// Layout backed by a closure.
pub struct FnLayout<F>(pub F);

impl<F> Layout for FnLayout<F>
where
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    fn render(&self, record: &LogRecord) -> String {
        (self.0)(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExceptionFormat {
    Type,
    Message,
    ToString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Renderer {
    Level,
    Logger,
    Message,
    MachineName(String),
    Date,
    Exception(ExceptionFormat),
    Property(String),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Keep,
    Lower,
    Upper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Render(Renderer, Case),
}

#[derive(Debug, Clone)]
pub struct SimpleLayout {
    segments: Vec<Segment>,
}

impl SimpleLayout {
    pub fn new(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find("${") {
            let Some(len) = rest[start + 2..].find('}') else {
                break;
            };
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            segments.push(parse_renderer(&rest[start + 2..start + 2 + len]));
            rest = &rest[start + 2 + len + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Self { segments }
    }
}

fn parse_renderer(spec: &str) -> Segment {
    let mut parts = spec.split(':');
    let name = parts.next().unwrap_or_default().trim().to_ascii_lowercase();

    let mut case = Case::Keep;
    let mut format = None;
    let mut item = None;
    for option in parts {
        let (key, value) = option.split_once('=').unwrap_or((option, ""));
        match (key.trim().to_ascii_lowercase().as_str(), value.trim()) {
            ("lowercase", v) if v.eq_ignore_ascii_case("true") => case = Case::Lower,
            ("uppercase", v) if v.eq_ignore_ascii_case("true") => case = Case::Upper,
            ("format", v) => format = Some(v.to_ascii_lowercase()),
            ("item", v) => item = Some(v.to_string()),
            _ => {}
        }
    }

    let renderer = match name.as_str() {
        "level" => Renderer::Level,
        "logger" => Renderer::Logger,
        "message" => Renderer::Message,
        "machinename" => Renderer::MachineName(get_hostname()),
        "date" | "longdate" => Renderer::Date,
        "exception" => Renderer::Exception(match format.as_deref() {
            Some("type") => ExceptionFormat::Type,
            Some("tostring") => ExceptionFormat::ToString,
            _ => ExceptionFormat::Message,
        }),
        "event-properties" | "event-property" => match item {
            Some(item) => Renderer::Property(item),
            None => Renderer::Empty,
        },
        _ => Renderer::Empty,
    };

    Segment::Render(renderer, case)
}

fn render_value(renderer: &Renderer, record: &LogRecord) -> String {
    match renderer {
        Renderer::Level => record.level.as_str().to_string(),
        Renderer::Logger => record.logger.clone(),
        Renderer::Message => record.message.clone(),
        Renderer::MachineName(host) => host.clone(),
        Renderer::Date => record
            .timestamp()
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        Renderer::Exception(format) => match &record.exception {
            Some(e) => match format {
                ExceptionFormat::Type => e.type_name.clone(),
                ExceptionFormat::Message => e.message.clone(),
                ExceptionFormat::ToString => e.detail.clone(),
            },
            None => String::new(),
        },
        Renderer::Property(item) => match record.properties.get(item) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        },
        Renderer::Empty => String::new(),
    }
}

impl Layout for SimpleLayout {
    fn render(&self, record: &LogRecord) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Render(renderer, case) => {
                    let value = render_value(renderer, record);
                    match case {
                        Case::Keep => out.push_str(&value),
                        Case::Lower => out.push_str(&value.to_lowercase()),
                        Case::Upper => out.push_str(&value.to_uppercase()),
                    }
                }
            }
        }
        out
    }
}

pub struct JsonAttribute {
    pub name: String,
    pub layout: SharedLayout,
    /// When false, the rendered text is embedded as raw JSON if it parses.
    pub encode: bool,
}

impl JsonAttribute {
    pub fn new(name: impl Into<String>, layout: impl Layout + 'static) -> Self {
        Self {
            name: name.into(),
            layout: Arc::new(layout),
            encode: true,
        }
    }

    pub fn raw(name: impl Into<String>, layout: impl Layout + 'static) -> Self {
        Self {
            encode: false,
            ..Self::new(name, layout)
        }
    }
}

/// Renders a JSON object, one member per non-empty attribute.
///
/// Renders an empty string when no member is emitted.
#[derive(Default)]
pub struct JsonLayout {
    pub attributes: Vec<JsonAttribute>,
    pub include_event_properties: bool,
}

impl JsonLayout {
    pub fn new(attributes: Vec<JsonAttribute>) -> Self {
        Self {
            attributes,
            include_event_properties: false,
        }
    }

    pub fn event_properties() -> Self {
        Self {
            attributes: Vec::new(),
            include_event_properties: true,
        }
    }
}

impl Layout for JsonLayout {
    fn render(&self, record: &LogRecord) -> String {
        let mut object = Map::new();

        for attribute in &self.attributes {
            let rendered = attribute.layout.render(record);
            if rendered.is_empty() {
                continue;
            }
            let value = if attribute.encode {
                Value::String(rendered)
            } else {
                serde_json::from_str(&rendered).unwrap_or(Value::String(rendered))
            };
            object.insert(attribute.name.clone(), value);
        }

        if self.include_event_properties {
            for (key, value) in &record.properties {
                object
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        if object.is_empty() {
            String::new()
        } else {
            Value::Object(object).to_string()
        }
    }
}
