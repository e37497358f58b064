//! The individual schema upgrades

use super::{rewrite_document, write_event, Rewrite};
use crate::error::{PersistenceError, PersistenceResult};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::mem;

const SIMULATION: &[u8] = b"simulation";
const SIMULATION_DESCRIPTOR: &[u8] = b"simulationDescriptor";
const FACT_MAPPING: &[u8] = b"FactMapping";
const EXPRESSION_ELEMENTS: &[u8] = b"expressionElements";
const EXPRESSION_ELEMENT: &[u8] = b"ExpressionElement";

/// 1.0 → 1.1
pub(super) fn rename_expected(xml: &str, to: &'static str) -> PersistenceResult<String> {
    rewrite_document(xml, to, &mut RenameExpected)
}

/// 1.1 → 1.2
pub(super) fn add_type_and_session(xml: &str, to: &'static str) -> PersistenceResult<String> {
    rewrite_document(xml, to, &mut TypeAndSession::default())
}

/// 1.2 → 1.3
pub(super) fn add_root_expression_elements(
    xml: &str,
    to: &'static str,
) -> PersistenceResult<String> {
    rewrite_document(xml, to, &mut RootExpressionElements::default())
}

struct RenameExpected;

impl Rewrite for RenameExpected {
    fn rewrite(
        &mut self,
        event: Event<'_>,
        ancestors: &[Vec<u8>],
        out: &mut Writer<Vec<u8>>,
    ) -> PersistenceResult<()> {
        if let Event::Text(text) = &event {
            let in_type = ancestors.last().is_some_and(|name| name.as_slice() == b"type");
            if in_type && text.unescape().map_err(PersistenceError::xml)?.trim() == "EXPECTED" {
                return write_event(out, Event::Text(BytesText::new("EXPECT")));
            }
        }
        write_event(out, event)
    }
}

#[derive(Debug, Default)]
struct DescriptorFrame {
    has_session: bool,
    has_type: bool,
}

/// Adds `<dmoSession></dmoSession>` and `<type>RULE</type>` to the
/// simulation descriptor; 1.1 documents only described rule bases.
#[derive(Debug, Default)]
struct TypeAndSession {
    frame: Option<DescriptorFrame>,
}

impl TypeAndSession {
    fn close(frame: &DescriptorFrame, out: &mut Writer<Vec<u8>>) -> PersistenceResult<()> {
        if !frame.has_session {
            write_event(out, Event::Start(BytesStart::new("dmoSession")))?;
            write_event(out, Event::End(BytesEnd::new("dmoSession")))?;
        }
        if !frame.has_type {
            text_element(out, "type", "RULE")?;
        }
        Ok(())
    }
}

fn is_descriptor(name: &[u8], ancestors: &[Vec<u8>]) -> bool {
    name == SIMULATION_DESCRIPTOR && ancestors.last().is_some_and(|p| p.as_slice() == SIMULATION)
}

impl Rewrite for TypeAndSession {
    fn rewrite(
        &mut self,
        event: Event<'_>,
        ancestors: &[Vec<u8>],
        out: &mut Writer<Vec<u8>>,
    ) -> PersistenceResult<()> {
        match &event {
            Event::Start(e) if is_descriptor(e.name().as_ref(), ancestors) => {
                self.frame = Some(DescriptorFrame::default());
            }
            Event::Empty(e) if is_descriptor(e.name().as_ref(), ancestors) => {
                write_event(out, Event::Start(e.clone()))?;
                Self::close(&DescriptorFrame::default(), out)?;
                return write_event(out, Event::End(BytesEnd::new("simulationDescriptor")));
            }
            Event::Start(e) | Event::Empty(e)
                if ancestors.last().is_some_and(|p| p.as_slice() == SIMULATION_DESCRIPTOR) =>
            {
                if let Some(frame) = self.frame.as_mut() {
                    match e.name().as_ref() {
                        b"dmoSession" => frame.has_session = true,
                        b"type" => frame.has_type = true,
                        _ => {}
                    }
                }
            }
            Event::End(e) if is_descriptor(e.name().as_ref(), ancestors) => {
                if let Some(frame) = self.frame.take() {
                    Self::close(&frame, out)?;
                }
            }
            _ => {}
        }
        write_event(out, event)
    }
}

/// Buffers each `FactMapping` and, when it has no expression element,
/// roots it at the fact's simple type name.
#[derive(Debug, Default)]
struct RootExpressionElements {
    buffer: Vec<Event<'static>>,
    depth: Option<usize>,
}

impl Rewrite for RootExpressionElements {
    fn rewrite(
        &mut self,
        event: Event<'_>,
        ancestors: &[Vec<u8>],
        out: &mut Writer<Vec<u8>>,
    ) -> PersistenceResult<()> {
        if let Some(depth) = self.depth {
            let closes = matches!(&event, Event::End(e) if e.name().as_ref() == FACT_MAPPING)
                && ancestors.len() == depth;
            self.buffer.push(event.into_owned());
            if closes {
                self.depth = None;
                let events = mem::take(&mut self.buffer);
                flush_fact_mapping(events, out)?;
            }
            return Ok(());
        }

        match &event {
            Event::Start(e) if e.name().as_ref() == FACT_MAPPING => {
                self.depth = Some(ancestors.len());
                self.buffer.push(event.into_owned());
                Ok(())
            }
            Event::Empty(e) if e.name().as_ref() == FACT_MAPPING => {
                write_event(out, Event::Start(e.clone()))?;
                write_root_element(out, "")?;
                write_event(out, Event::End(BytesEnd::new("FactMapping")))
            }
            _ => write_event(out, event),
        }
    }
}

#[derive(Debug, Default)]
struct FactMappingSummary {
    expression_elements: usize,
    fact_class_name: String,
    fact_name: String,
    expression_name: String,
}

impl FactMappingSummary {
    fn of(events: &[Event<'static>]) -> PersistenceResult<Self> {
        let mut summary = Self::default();
        let mut path: Vec<&[u8]> = Vec::new();

        for event in events {
            match event {
                Event::Start(e) => {
                    if e.name().as_ref() == EXPRESSION_ELEMENT {
                        summary.expression_elements += 1;
                    }
                    path.push(e.local_name().into_inner());
                }
                Event::Empty(e) if e.name().as_ref() == EXPRESSION_ELEMENT => {
                    summary.expression_elements += 1;
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Text(t) => {
                    let target = match path.as_slice() {
                        [_, b"factIdentifier", b"className"] => &mut summary.fact_class_name,
                        [_, b"factIdentifier", b"name"] => &mut summary.fact_name,
                        [_, b"expressionIdentifier", b"name"] => &mut summary.expression_name,
                        _ => continue,
                    };
                    *target = t.unescape().map_err(PersistenceError::xml)?.trim().to_string();
                }
                _ => {}
            }
        }

        Ok(summary)
    }

    fn root_step(&self) -> &str {
        let simple = self
            .fact_class_name
            .rsplit(['.', '$'])
            .next()
            .unwrap_or_default();
        [simple, self.fact_name.as_str(), self.expression_name.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }
}

fn flush_fact_mapping(events: Vec<Event<'static>>, out: &mut Writer<Vec<u8>>) -> PersistenceResult<()> {
    let summary = FactMappingSummary::of(&events)?;
    if summary.expression_elements > 0 {
        for event in events {
            write_event(out, event)?;
        }
        return Ok(());
    }

    let mut events = events.into_iter();
    if let Some(start) = events.next() {
        write_event(out, start)?;
    }
    write_root_element(out, summary.root_step())?;

    let mut depth = 0usize;
    let mut skip = 0usize;
    for event in events {
        if skip > 0 {
            match event {
                Event::Start(_) => skip += 1,
                Event::End(_) => skip -= 1,
                _ => {}
            }
            continue;
        }
        match &event {
            Event::Start(e) if depth == 0 && e.name().as_ref() == EXPRESSION_ELEMENTS => {
                skip = 1;
                continue;
            }
            Event::Empty(e) if depth == 0 && e.name().as_ref() == EXPRESSION_ELEMENTS => continue,
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        write_event(out, event)?;
    }
    Ok(())
}

fn write_root_element(out: &mut Writer<Vec<u8>>, step: &str) -> PersistenceResult<()> {
    write_event(out, Event::Start(BytesStart::new("expressionElements")))?;
    write_event(out, Event::Start(BytesStart::new("ExpressionElement")))?;
    text_element(out, "step", step)?;
    write_event(out, Event::End(BytesEnd::new("ExpressionElement")))?;
    write_event(out, Event::End(BytesEnd::new("expressionElements")))
}

fn text_element(out: &mut Writer<Vec<u8>>, name: &str, text: &str) -> PersistenceResult<()> {
    write_event(out, Event::Start(BytesStart::new(name)))?;
    write_event(out, Event::Text(BytesText::new(text)))?;
    write_event(out, Event::End(BytesEnd::new(name)))
}
