//! Particle effect definitions (`particles/*.xml`).
//!
//! An effect file is an XML *fragment*: a sequence of `<Emitter>` elements
//! with no single root. Each emitter is a flat bag of leaf elements, most of
//! which hold a [`ParameterTrack`] in the keyframe mini-language described
//! in [`track`].
//!
//! ```text
//! <Emitter>
//!     <Name>Spark</Name>
//!     <SpawnRate>[5 10]</SpawnRate>
//!     <ParticleAlpha>1 0,100 EaseIn</ParticleAlpha>
//!     <Field>
//!         <FieldType>Acceleration</FieldType>
//!         <Y>0.2</Y>
//!     </Field>
//! </Emitter>
//! ```
//!
//! Only parsing is provided; nothing here simulates or renders particles.

use std::io::Read;

use tracing::debug;

use crate::Result;

pub mod track;
mod xml;

pub use track::{
    CurveType, Distribution, GrammarError, GrammarErrorKind, ParameterTrack, TrackNode, parse_track,
};

track::named_enum! {
    /// Shape of the region particles are spawned in.
    pub enum EmitterType {
        Circle,
        Box,
        BoxPath,
        CirclePath,
        CircleEvenSpacing,
    }
}

track::named_enum! {
    /// Kind of force a [`Field`] applies to live particles.
    pub enum FieldType {
        Invalid,
        Friction,
        Acceleration,
        Attractor,
        MaxVelocity,
        Velocity,
        Position,
        SystemPosition,
        GroundConstraint,
        Shake,
        Circle,
        Away,
    }
}

/// A parsed particle effect: its emitters in file order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub emitters: Vec<Emitter>,
}

/// One particle emitter.
///
/// Fields absent from the definition stay at their [`Default`]; a track
/// that is present but blank is `Some` of an empty [`ParameterTrack`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Emitter {
    pub name: Option<String>,
    /// Image resource identifier.
    pub image: Option<String>,
    /// Number of animation frames in `image`.
    pub image_frames: Option<i32>,
    pub emitter_type: Option<EmitterType>,

    pub random_launch_spin: bool,
    pub system_loops: bool,
    pub particle_loops: bool,
    pub random_start_time: bool,
    /// Blend additively instead of alpha blending.
    pub additive: bool,
    /// Skip the emitter on software renderers.
    pub hardware_only: bool,

    pub system_duration: Option<ParameterTrack>,
    pub spawn_rate: Option<ParameterTrack>,
    pub spawn_min_active: Option<ParameterTrack>,
    pub spawn_max_launched: Option<ParameterTrack>,
    pub emitter_radius: Option<ParameterTrack>,
    pub emitter_offset_x: Option<ParameterTrack>,
    pub emitter_offset_y: Option<ParameterTrack>,
    pub particle_duration: Option<ParameterTrack>,
    pub launch_speed: Option<ParameterTrack>,
    pub launch_angle: Option<ParameterTrack>,
    pub particle_red: Option<ParameterTrack>,
    pub particle_green: Option<ParameterTrack>,
    pub particle_blue: Option<ParameterTrack>,
    pub particle_alpha: Option<ParameterTrack>,
    pub particle_brightness: Option<ParameterTrack>,
    pub particle_spin_angle: Option<ParameterTrack>,
    pub particle_spin_speed: Option<ParameterTrack>,
    pub particle_scale: Option<ParameterTrack>,

    /// Force fields, in definition order.
    pub fields: Vec<Field>,
}

/// A force field attached to an [`Emitter`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    pub field_type: Option<FieldType>,
    pub x: Option<ParameterTrack>,
    pub y: Option<ParameterTrack>,
}

impl Effect {
    /// Parse an effect from the text of a particle definition file.
    pub fn from_str_fragment(text: &str) -> Result<Self> {
        let effect = xml::read_effect(text)?;
        debug!(emitters = effect.emitters.len(), "parsed particle effect");
        Ok(effect)
    }

    /// Read a whole particle definition from `r` and parse it.
    pub fn from_reader<R: Read>(mut r: R) -> Result<Self> {
        let mut text = String::new();
        r.read_to_string(&mut text)?;
        Self::from_str_fragment(&text)
    }

    /// Find an emitter by name.
    pub fn emitter(&self, name: &str) -> Option<&Emitter> {
        self.emitters
            .iter()
            .find(|e| e.name.as_deref() == Some(name))
    }
}
