//! Markup layer: walks the XML fragment and routes each leaf element to
//! the matching [`Emitter`] or [`Field`] member.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use tracing::trace;

use super::track::parse_track;
use super::{Effect, Emitter, EmitterType, Field, FieldType, ParameterTrack};
use crate::{Error, Result};

pub(super) fn read_effect(text: &str) -> Result<Effect> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut r = MarkupReader { reader };

    let mut emitters = Vec::new();
    loop {
        match r.reader.read_event()? {
            Event::Start(e) => match tag_name(e.name()).as_str() {
                "Emitter" => emitters.push(r.emitter()?),
                tag => return Err(unexpected_tag("effect", tag)),
            },
            Event::Empty(e) => match tag_name(e.name()).as_str() {
                "Emitter" => emitters.push(Emitter::default()),
                tag => return Err(unexpected_tag("effect", tag)),
            },
            Event::End(_) => return Err(unexpected_node("effect", "end tag")),
            Event::Text(_) | Event::CData(_) => return Err(unexpected_node("effect", "text")),
            Event::Eof => break,
            // Declarations, comments and processing instructions.
            _ => {}
        }
    }

    Ok(Effect { emitters })
}

struct MarkupReader<'a> {
    reader: Reader<&'a [u8]>,
}

/// Leaf element that has just been opened.
struct Leaf {
    tag: String,
    empty: bool,
}

impl MarkupReader<'_> {
    fn emitter(&mut self) -> Result<Emitter> {
        let mut emitter = Emitter::default();

        loop {
            let leaf = match self.reader.read_event()? {
                Event::Start(e) => open(&e, false),
                Event::Empty(e) => open(&e, true),
                Event::End(e) => {
                    expect_end("Emitter", e.name())?;
                    break;
                }
                Event::Text(_) | Event::CData(_) => return Err(unexpected_node("Emitter", "text")),
                Event::Eof => return Err(Error::UnexpectedEof),
                _ => continue,
            };

            match leaf.tag.as_str() {
                "Field" => {
                    let field = if leaf.empty { Field::default() } else { self.field()? };
                    emitter.fields.push(field);
                }
                "Name" => emitter.name = Some(self.text(&leaf)?),
                "Image" => emitter.image = Some(self.text(&leaf)?),
                "ImageFrames" => emitter.image_frames = Some(self.int(&leaf)?),
                "EmitterType" => {
                    let text = self.text(&leaf)?;
                    emitter.emitter_type = Some(
                        EmitterType::from_name(&text).ok_or_else(|| invalid(&leaf, text))?,
                    );
                }
                "RandomLaunchSpin" => emitter.random_launch_spin = self.bool(&leaf)?,
                "SystemLoops" => emitter.system_loops = self.bool(&leaf)?,
                "ParticleLoops" => emitter.particle_loops = self.bool(&leaf)?,
                "RandomStartTime" => emitter.random_start_time = self.bool(&leaf)?,
                "Additive" => emitter.additive = self.bool(&leaf)?,
                "HardwareOnly" => emitter.hardware_only = self.bool(&leaf)?,
                "SystemDuration" => emitter.system_duration = Some(self.track(&leaf)?),
                "SpawnRate" => emitter.spawn_rate = Some(self.track(&leaf)?),
                "SpawnMinActive" => emitter.spawn_min_active = Some(self.track(&leaf)?),
                "SpawnMaxLaunched" => emitter.spawn_max_launched = Some(self.track(&leaf)?),
                "EmitterRadius" => emitter.emitter_radius = Some(self.track(&leaf)?),
                "EmitterOffsetX" => emitter.emitter_offset_x = Some(self.track(&leaf)?),
                "EmitterOffsetY" => emitter.emitter_offset_y = Some(self.track(&leaf)?),
                "ParticleDuration" => emitter.particle_duration = Some(self.track(&leaf)?),
                "LaunchSpeed" => emitter.launch_speed = Some(self.track(&leaf)?),
                "LaunchAngle" => emitter.launch_angle = Some(self.track(&leaf)?),
                "ParticleRed" => emitter.particle_red = Some(self.track(&leaf)?),
                "ParticleGreen" => emitter.particle_green = Some(self.track(&leaf)?),
                "ParticleBlue" => emitter.particle_blue = Some(self.track(&leaf)?),
                "ParticleAlpha" => emitter.particle_alpha = Some(self.track(&leaf)?),
                "ParticleBrightness" => emitter.particle_brightness = Some(self.track(&leaf)?),
                "ParticleSpinAngle" => emitter.particle_spin_angle = Some(self.track(&leaf)?),
                "ParticleSpinSpeed" => emitter.particle_spin_speed = Some(self.track(&leaf)?),
                "ParticleScale" => emitter.particle_scale = Some(self.track(&leaf)?),
                tag => return Err(unexpected_tag("Emitter", tag)),
            }
        }

        trace!(name = ?emitter.name, fields = emitter.fields.len(), "emitter");
        Ok(emitter)
    }

    fn field(&mut self) -> Result<Field> {
        let mut field = Field::default();

        loop {
            let leaf = match self.reader.read_event()? {
                Event::Start(e) => open(&e, false),
                Event::Empty(e) => open(&e, true),
                Event::End(e) => {
                    expect_end("Field", e.name())?;
                    break;
                }
                Event::Text(_) | Event::CData(_) => return Err(unexpected_node("Field", "text")),
                Event::Eof => return Err(Error::UnexpectedEof),
                _ => continue,
            };

            match leaf.tag.as_str() {
                "FieldType" => {
                    let text = self.text(&leaf)?;
                    field.field_type =
                        Some(FieldType::from_name(&text).ok_or_else(|| invalid(&leaf, text))?);
                }
                "X" => field.x = Some(self.track(&leaf)?),
                "Y" => field.y = Some(self.track(&leaf)?),
                tag => return Err(unexpected_tag("Field", tag)),
            }
        }

        Ok(field)
    }

    /// Read the text content of `leaf` up to and including its end tag.
    fn text(&mut self, leaf: &Leaf) -> Result<String> {
        if leaf.empty {
            return Ok(String::new());
        }

        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => text.push_str(&t.unescape().map_err(quick_xml::Error::from)?),
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
                Event::End(e) => {
                    expect_end(&leaf.tag, e.name())?;
                    return Ok(text);
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(Error::UnexpectedTag {
                        parent: "leaf element",
                        tag: tag_name(e.name()),
                    });
                }
                Event::Eof => return Err(Error::UnexpectedEof),
                _ => {}
            }
        }
    }

    fn int(&mut self, leaf: &Leaf) -> Result<i32> {
        let text = self.text(leaf)?;
        text.trim().parse().map_err(|_| invalid(leaf, text))
    }

    fn bool(&mut self, leaf: &Leaf) -> Result<bool> {
        let text = self.text(leaf)?;
        match text.as_str() {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(invalid(leaf, text)),
        }
    }

    fn track(&mut self, leaf: &Leaf) -> Result<ParameterTrack> {
        let text = self.text(leaf)?;
        parse_track(&text).map_err(|source| Error::Track {
            tag: leaf.tag.clone(),
            source,
        })
    }
}

fn open(e: &BytesStart<'_>, empty: bool) -> Leaf {
    Leaf {
        tag: tag_name(e.name()),
        empty,
    }
}

fn tag_name(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

fn expect_end(expected: &str, found: QName<'_>) -> Result<()> {
    if found.as_ref() == expected.as_bytes() {
        Ok(())
    } else {
        Err(Error::MismatchedEnd {
            expected: expected.to_owned(),
            found: tag_name(found),
        })
    }
}

fn unexpected_tag(parent: &'static str, tag: &str) -> Error {
    Error::UnexpectedTag {
        parent,
        tag: tag.to_owned(),
    }
}

fn unexpected_node(parent: &str, kind: &'static str) -> Error {
    Error::UnexpectedNode {
        parent: parent.to_owned(),
        kind,
    }
}

fn invalid(leaf: &Leaf, value: String) -> Error {
    Error::InvalidValue {
        tag: leaf.tag.clone(),
        value,
    }
}
