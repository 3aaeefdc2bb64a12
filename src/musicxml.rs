//! # MusicXML Reader
//!
//! Reads a partwise MusicXML document into the [`Score`] model.
//!
//! The document is first materialised as a small owned element tree
//! ([`XmlElement`]) using `quick-xml`, then queried by path the way the
//! MusicXML layout is usually described (`notations/technical/fret`). All
//! presence checks (rest, tie, grace, chord, ...) are decided here once per
//! note so the timeline walk never looks at XML.
//!
//! ## What is read
//! - `part-list/score-part`: id, `part-name`, first `midi-program`
//! - `part[@id]`: the first `staff-details` carrying `staff-tuning` entries
//! - `measure`: `attributes/time/beats` and `beat-type` (either alone is kept), every `note` child
//! - `note`: voice, type, dot, time-modification, chord, rest, tie/tied,
//!   grace, `notations/technical/{string,fret}`, `notations/dynamics/*`
//!
//! Everything else (directions, backup/forward, print layout) is ignored.

use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ast::*;
use crate::config::TRACKED_VOICE;
use crate::error::TabError;

fn xml_error(e: impl std::fmt::Display) -> TabError {
    TabError::Xml(e.to_string())
}

/// An element with its attributes, concatenated text and child elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a whole document and return its root element.
    pub fn parse(xml: &str) -> Result<Self, TabError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(start) => stack.push(Self::open(&start)?),
                Event::Empty(start) => {
                    let element = Self::open(&start)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| TabError::Xml("unexpected closing tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text.unescape().map_err(xml_error)?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(TabError::Xml(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_else(|| TabError::Xml("document has no root element".to_string()))
    }

    fn open(start: &BytesStart) -> Result<Self, TabError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(xml_error)?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    fn attach(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        element: XmlElement,
    ) -> Result<(), TabError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(TabError::Xml("more than one root element".to_string())),
        }
        Ok(())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed text content.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a, 'b>(
        &'a self,
        name: &'b str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'b
    where
        'a: 'b,
    {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First element matching a slash-separated child path such as
    /// `"notations/technical/string"`. Every branch is searched, so a match
    /// under the second `<notations>` is still found.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        let (head, rest) = match path.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        self.children
            .iter()
            .filter(|child| child.name == head)
            .find_map(|child| match rest {
                Some(rest) => child.find(rest),
                None => Some(child),
            })
    }

    /// Every descendant named `name`, in document order.
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }
}

fn parse_number<T: FromStr>(element: &XmlElement) -> Result<T, TabError> {
    element.text().parse().map_err(|_| {
        TabError::InvalidScore(format!(
            "invalid <{}> value: {:?}",
            element.name,
            element.text()
        ))
    })
}

fn parse_optional<T: FromStr>(element: Option<&XmlElement>) -> Result<Option<T>, TabError> {
    element.map(parse_number).transpose()
}

/// Read a partwise MusicXML document.
///
/// # Example
/// ```rust
/// use tabmidi::musicxml::read_score;
///
/// let xml = r#"<score-partwise>
///   <part-list><score-part id="P1"><part-name>Guitar</part-name></score-part></part-list>
///   <part id="P1"><measure number="1"/></part>
/// </score-partwise>"#;
///
/// let score = read_score(xml).unwrap();
/// assert_eq!(score.parts[0].name, "Guitar");
/// assert_eq!(score.parts[0].measures.len(), 1);
/// ```
pub fn read_score(xml: &str) -> Result<Score, TabError> {
    let root = XmlElement::parse(xml)?;
    if root.name != "score-partwise" {
        return Err(TabError::InvalidScore(format!(
            "expected <score-partwise> root, found <{}>",
            root.name
        )));
    }

    let parts = match root.child("part-list") {
        Some(part_list) => part_list
            .children_named("score-part")
            .map(|score_part| read_part(&root, score_part))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(Score { parts })
}

fn read_part(root: &XmlElement, score_part: &XmlElement) -> Result<Part, TabError> {
    let id = score_part
        .attr("id")
        .ok_or_else(|| TabError::InvalidScore("<score-part> without id".to_string()))?;
    let body = root
        .children_named("part")
        .find(|part| part.attr("id") == Some(id))
        .ok_or_else(|| TabError::InvalidScore(format!("no <part> for score-part {}", id)))?;

    let name = score_part
        .child("part-name")
        .map(|name| name.text().to_string())
        .unwrap_or_default();
    let program = parse_optional(score_part.descendants("midi-program").first().copied())?
        .unwrap_or(0);

    let measures = body
        .children_named("measure")
        .map(read_measure)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Part {
        id: id.to_string(),
        name,
        program,
        tuning: read_tuning(body)?,
        measures,
    })
}

/// Tuning from the first `<staff-details>` that declares any strings.
fn read_tuning(part: &XmlElement) -> Result<Vec<TuningEntry>, TabError> {
    let Some(details) = part
        .descendants("staff-details")
        .into_iter()
        .find(|details| details.child("staff-tuning").is_some())
    else {
        return Ok(Vec::new());
    };

    details
        .children_named("staff-tuning")
        .map(|tuning| {
            let step = tuning
                .child("tuning-step")
                .map(|step| step.text().to_string())
                .unwrap_or_default();
            let octave = tuning
                .child("tuning-octave")
                .ok_or_else(|| TabError::InvalidScore("<staff-tuning> without octave".to_string()))
                .and_then(parse_number)?;
            // <tuning-alter> is a decimal; microtones round to the nearest semitone
            let alter: f64 = parse_optional(tuning.child("tuning-alter"))?.unwrap_or(0.0);
            Ok(TuningEntry {
                step,
                octave,
                alter: alter.round() as i32,
            })
        })
        .collect()
}

fn read_measure(measure: &XmlElement) -> Result<Measure, TabError> {
    let number = measure.attr("number").unwrap_or_default().to_string();

    let beats: Option<u32> = parse_optional(measure.find("attributes/time/beats"))?;
    let beat_type: Option<u32> = parse_optional(measure.find("attributes/time/beat-type"))?;
    if beat_type == Some(0) {
        return Err(TabError::InvalidScore(format!(
            "beat-type 0 in measure {}",
            number
        )));
    }
    // Each value may change on its own; the walk merges it into the current one
    let time_change = match (beats, beat_type) {
        (None, None) => None,
        _ => Some(TimeChange { beats, beat_type }),
    };

    let notes = measure
        .children_named("note")
        .map(|note| read_note(note, &number))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Measure {
        number,
        time_change,
        notes,
    })
}

fn read_note(note: &XmlElement, measure: &str) -> Result<Note, TabError> {
    let invalid = |message: &str| {
        TabError::InvalidScore(format!("{} in measure {}", message, measure))
    };

    let voice = parse_optional(note.child("voice"))?.unwrap_or(TRACKED_VOICE);

    let name = note
        .child("type")
        .ok_or_else(|| invalid("note without <type>"))?
        .text();
    let actual = parse_optional(note.find("time-modification/actual-notes"))?.unwrap_or(1);
    let normal = parse_optional(note.find("time-modification/normal-notes"))?.unwrap_or(1);
    if actual == 0 || normal == 0 {
        return Err(invalid("zero tuplet ratio"));
    }
    let duration = DurationSpec {
        name: name.to_string(),
        dotted: note.child("dot").is_some(),
        tuplet: TupletRatio { actual, normal },
    };

    let kind = if note.child("rest").is_some() {
        NoteKind::Rest
    } else if let Some(string) = note.find("notations/technical/string") {
        let number: usize = parse_number(string)?;
        let string = number
            .checked_sub(1)
            .ok_or_else(|| invalid("string number 0"))?;
        let fret = parse_optional(note.find("notations/technical/fret"))?.unwrap_or(0);
        NoteKind::Pitched { string, fret }
    } else {
        NoteKind::Unfretted
    };

    let grace = match note.child("grace") {
        Some(grace) => {
            let steal = grace
                .attr("steal-time-previous")
                .ok_or_else(|| invalid("grace note without steal-time-previous"))?;
            let steal_percent: f64 = steal
                .trim()
                .trim_end_matches('%')
                .parse()
                .ok()
                .filter(|percent: &f64| (0.0..=100.0).contains(percent))
                .ok_or_else(|| invalid(&format!("invalid steal-time-previous {:?}", steal)))?;
            Some(Grace { steal_percent })
        }
        None => None,
    };

    let dynamics = note
        .find("notations/dynamics")
        .and_then(|dynamics| dynamics.children.first())
        .map(|marking| marking.name.clone());

    Ok(Note {
        voice,
        kind,
        duration,
        chord: note.child("chord").is_some(),
        tie: read_tie_role(note),
        grace,
        dynamics,
    })
}

/// `<tie>` drives playback; `<notations><tied>` is accepted as well since
/// some exporters only write the notation form.
fn read_tie_role(note: &XmlElement) -> TieRole {
    let tied = note
        .children_named("notations")
        .flat_map(|notations| notations.children_named("tied"));
    let types: Vec<&str> = note
        .children_named("tie")
        .chain(tied)
        .filter_map(|tie| tie.attr("type"))
        .collect();

    let start = types.iter().any(|t| *t == "start");
    let stop = types.iter().any(|t| *t == "stop");
    match (start, stop) {
        (true, true) => TieRole::Continue,
        (true, false) => TieRole::Start,
        (false, true) => TieRole::Stop,
        (false, false) => TieRole::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(measures: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="4.0">
  <part-list>
    <score-part id="P1">
      <part-name>Lead &amp; Rhythm</part-name>
      <midi-instrument id="P1-I1"><midi-program>30</midi-program></midi-instrument>
    </score-part>
  </part-list>
  <part id="P1">{}</part>
</score-partwise>"#,
            measures
        )
    }

    #[test]
    fn test_element_tree_queries() {
        let root = XmlElement::parse(
            r#"<a x="1"><b><c>one</c></b><b><d> two </d></b><e/></a>"#,
        )
        .unwrap();
        assert_eq!(root.attr("x"), Some("1"));
        assert_eq!(root.find("b/d").unwrap().text(), "two");
        assert_eq!(root.find("b/c").unwrap().text(), "one");
        assert!(root.find("b/e").is_none());
        assert_eq!(root.children_named("b").count(), 2);
        assert_eq!(root.descendants("d").len(), 1);
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(XmlElement::parse("<a><b></a>"), Err(TabError::Xml(_))));
        assert!(matches!(XmlElement::parse("<a>"), Err(TabError::Xml(_))));
        assert!(matches!(XmlElement::parse(""), Err(TabError::Xml(_))));
    }

    #[test]
    fn test_part_header_and_tuning() {
        let xml = wrap(
            r#"<measure number="1">
                 <attributes>
                   <time><beats>3</beats><beat-type>4</beat-type></time>
                   <staff-details>
                     <staff-lines>2</staff-lines>
                     <staff-tuning line="1"><tuning-step>E</tuning-step><tuning-octave>2</tuning-octave></staff-tuning>
                     <staff-tuning line="2"><tuning-step>B</tuning-step><tuning-alter>-1</tuning-alter><tuning-octave>2</tuning-octave></staff-tuning>
                   </staff-details>
                 </attributes>
               </measure>
               <measure number="2">
                 <attributes>
                   <staff-details>
                     <staff-tuning line="1"><tuning-step>D</tuning-step><tuning-octave>2</tuning-octave></staff-tuning>
                   </staff-details>
                 </attributes>
               </measure>"#,
        );
        let score = read_score(&xml).unwrap();
        let part = &score.parts[0];
        assert_eq!(part.id, "P1");
        assert_eq!(part.name, "Lead & Rhythm");
        assert_eq!(part.program, 30);
        assert_eq!(part.tuning.len(), 2);
        assert_eq!(part.tuning[1].step, "B");
        assert_eq!(part.tuning[1].alter, -1);
        assert_eq!(
            part.measures[0].time_change,
            Some(TimeChange {
                beats: Some(3),
                beat_type: Some(4)
            })
        );
        assert_eq!(part.measures[1].time_change, None);
    }

    #[test]
    fn test_note_fields() {
        let xml = wrap(
            r#"<measure number="1">
                 <note>
                   <grace steal-time-previous="50%"/>
                   <duration>1</duration>
                   <tie type="start"/>
                   <voice>1</voice>
                   <type>eighth</type>
                   <dot/>
                   <time-modification><actual-notes>3</actual-notes><normal-notes>2</normal-notes></time-modification>
                   <notations>
                     <dynamics><pp/></dynamics>
                     <technical><string>2</string><fret>5</fret></technical>
                   </notations>
                 </note>
                 <note><chord/><voice>2</voice><type>quarter</type>
                   <notations><technical><string>3</string><fret>0</fret></technical></notations>
                 </note>
                 <note><rest/><type>half</type></note>
                 <note><pitch><step>C</step><octave>4</octave></pitch><type>16th</type></note>
               </measure>"#,
        );
        let notes = &read_score(&xml).unwrap().parts[0].measures[0].notes;

        let first = &notes[0];
        assert_eq!(first.voice, 1);
        assert_eq!(first.kind, NoteKind::Pitched { string: 1, fret: 5 });
        assert_eq!(first.duration.name, "eighth");
        assert!(first.duration.dotted);
        assert_eq!(first.duration.tuplet, TupletRatio { actual: 3, normal: 2 });
        assert_eq!(first.tie, TieRole::Start);
        assert_eq!(first.grace, Some(Grace { steal_percent: 50.0 }));
        assert_eq!(first.dynamics.as_deref(), Some("pp"));
        assert!(!first.chord);

        assert!(notes[1].chord);
        assert_eq!(notes[1].voice, 2);
        assert_eq!(notes[1].kind, NoteKind::Pitched { string: 2, fret: 0 });

        assert_eq!(notes[2].kind, NoteKind::Rest);
        assert_eq!(notes[2].voice, 1);

        assert_eq!(notes[3].kind, NoteKind::Unfretted);
    }

    #[test]
    fn test_tie_roles() {
        let xml = wrap(
            r#"<measure number="1">
                 <note><tie type="stop"/><tie type="start"/><type>quarter</type></note>
                 <note><type>quarter</type><notations><tied type="stop"/></notations></note>
               </measure>"#,
        );
        let notes = &read_score(&xml).unwrap().parts[0].measures[0].notes;
        assert_eq!(notes[0].tie, TieRole::Continue);
        assert_eq!(notes[1].tie, TieRole::Stop);
    }

    #[test]
    fn test_structural_errors() {
        let missing_type = wrap(r#"<measure number="4"><note><rest/></note></measure>"#);
        assert_eq!(
            read_score(&missing_type),
            Err(TabError::InvalidScore("note without <type> in measure 4".to_string()))
        );

        let bad_grace = wrap(r#"<measure number="1"><note><grace/><type>eighth</type></note></measure>"#);
        assert!(matches!(read_score(&bad_grace), Err(TabError::InvalidScore(_))));

        let string_zero = wrap(
            r#"<measure number="1"><note><type>eighth</type>
               <notations><technical><string>0</string><fret>1</fret></technical></notations></note></measure>"#,
        );
        assert!(matches!(read_score(&string_zero), Err(TabError::InvalidScore(_))));

        let missing_part = r#"<score-partwise><part-list><score-part id="P9"/></part-list></score-partwise>"#;
        assert!(matches!(read_score(missing_part), Err(TabError::InvalidScore(_))));

        assert!(matches!(read_score("<score-timewise/>"), Err(TabError::InvalidScore(_))));
    }

    #[test]
    fn test_find_with_owned_path() {
        let root = XmlElement::parse("<note><notations><technical><fret>7</fret></technical></notations></note>")
            .unwrap();
        let path = format!("{}/{}/{}", "notations", "technical", "fret");
        let fret = root.find(&path);
        drop(path);
        assert_eq!(fret.map(XmlElement::text), Some("7"));
    }

    #[test]
    fn test_steal_time_previous_range() {
        let grace_note = |steal: &str| {
            wrap(&format!(
                r#"<measure number="2"><note><grace steal-time-previous="{}"/><type>eighth</type></note></measure>"#,
                steal
            ))
        };

        for steal in ["0", "33.3", "100%"] {
            assert!(read_score(&grace_note(steal)).is_ok(), "{:?} should be accepted", steal);
        }
        for steal in ["150%", "-10", "NaN", "inf", "half"] {
            assert!(
                matches!(read_score(&grace_note(steal)), Err(TabError::InvalidScore(_))),
                "{:?} should be rejected",
                steal
            );
        }
    }

    #[test]
    fn test_partial_time_change() {
        let xml = wrap(
            r#"<measure number="1"><attributes><time><beats>5</beats></time></attributes></measure>
               <measure number="2"><attributes><time><beat-type>8</beat-type></time></attributes></measure>"#,
        );
        let measures = &read_score(&xml).unwrap().parts[0].measures;
        assert_eq!(
            measures[0].time_change,
            Some(TimeChange {
                beats: Some(5),
                beat_type: None
            })
        );
        assert_eq!(
            measures[1].time_change,
            Some(TimeChange {
                beats: None,
                beat_type: Some(8)
            })
        );
    }
}
