// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::{self, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::Report;

pub(super) fn write(report: &Report, sink: &mut dyn Write) -> io::Result<()> {
    let mut writer = Writer::new_with_indent(sink, b' ', 2);
    write_document(&mut writer, report).map_err(into_io)?;
    writer.get_mut().write_all(b"\n")
}

fn write_document<W: Write>(writer: &mut Writer<W>, report: &Report) -> quick_xml::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("VMAF");
    root.push_attribute(("version", report.version));
    writer.write_event(Event::Start(root))?;

    let mut params = BytesStart::new("params");
    params.push_attribute(("subsample", report.subsample.to_string().as_str()));
    writer.write_event(Event::Empty(params))?;

    writer.write_event(Event::Start(BytesStart::new("frames")))?;
    for frame in &report.frames {
        let mut element = BytesStart::new("frame");
        element.push_attribute(("frameNum", frame.index.to_string().as_str()));
        for (name, value) in &frame.metrics {
            element.push_attribute((name.as_str(), format!("{:.6}", value).as_str()));
        }
        writer.write_event(Event::Empty(element))?;
    }
    writer.write_event(Event::End(BytesEnd::new("frames")))?;

    writer.write_event(Event::Start(BytesStart::new("pooled_metrics")))?;
    for (name, pooled) in &report.pooled_metrics {
        let mut metric = BytesStart::new("metric");
        metric.push_attribute(("name", name.as_str()));
        for (key, value) in [
            ("min", pooled.min),
            ("max", pooled.max),
            ("mean", pooled.mean),
            ("harmonic_mean", pooled.harmonic_mean),
        ] {
            metric.push_attribute((key, format!("{:.6}", value).as_str()));
        }
        writer.write_event(Event::Empty(metric))?;
    }
    writer.write_event(Event::End(BytesEnd::new("pooled_metrics")))?;

    writer.write_event(Event::End(BytesEnd::new("VMAF")))
}

fn into_io(error: quick_xml::Error) -> io::Error {
    match error {
        quick_xml::Error::Io(inner) => io::Error::new(inner.kind(), inner.to_string()),
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}
