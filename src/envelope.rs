//! Inscription envelopes.
//!
//! An envelope is a flat sequence of script elements:
//!
//! ```text
//! "ord" <part count> <content type> <count - 1> <part> <count - 2> <part> … 0 <part>
//! ```
//!
//! Part indices count down to zero, so a decoder knows where the envelope
//! ends without a length prefix, and anything after part zero, such as the
//! signature and redeem script of an unlock script, is ignored.

use {
  super::*,
  bitcoin::opcodes::{
    all::{OP_PUSHNUM_1, OP_PUSHNUM_16},
    Opcode,
  },
};

pub(crate) const PROTOCOL_ID: [u8; 3] = *b"ord";

/// Payload bytes carried by a single part.
pub const MAX_PART_LEN: usize = 240;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Element {
  Data(Vec<u8>),
  Number(u16),
  Op(Opcode),
}

impl Element {
  pub fn push(&self, builder: script::Builder) -> SnafuResult<script::Builder> {
    Ok(match self {
      Self::Data(data) => {
        if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
          return error::ElementTooLarge { len: data.len() }.fail();
        }

        builder.push_slice(
          PushBytesBuf::try_from(data.clone())
            .ok()
            .ok_or(SnafuError::ElementTooLarge { len: data.len() })?,
        )
      }
      Self::Number(0) => builder.push_opcode(opcodes::OP_FALSE),
      Self::Number(n) if *n <= 16 => {
        let [n, _] = n.to_le_bytes();
        builder.push_opcode(Opcode::from(OP_PUSHNUM_1.to_u8() + n - 1))
      }
      Self::Number(n) if *n < 128 => {
        let [n, _] = n.to_le_bytes();
        builder.push_slice([n])
      }
      Self::Number(n) => builder.push_slice(n.to_le_bytes()),
      Self::Op(opcode) => builder.push_opcode(*opcode),
    })
  }

  pub fn from_instruction(instruction: Instruction) -> Self {
    match instruction {
      Instruction::PushBytes(push) => Self::Data(push.as_bytes().to_vec()),
      Instruction::Op(opcode) => {
        let n = opcode.to_u8();
        if (OP_PUSHNUM_1.to_u8()..=OP_PUSHNUM_16.to_u8()).contains(&n) {
          Self::Number(u16::from(n - OP_PUSHNUM_1.to_u8() + 1))
        } else {
          Self::Op(opcode)
        }
      }
    }
  }

  /// Interpret the element as a part count or part index. Pushes of up to
  /// two bytes are little-endian numbers.
  pub fn number(&self) -> Option<u16> {
    match self {
      Self::Number(n) => Some(*n),
      Self::Data(data) => match data.as_slice() {
        [] => Some(0),
        [lo] => Some(u16::from(*lo)),
        [lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
      },
      Self::Op(_) => None,
    }
  }

  pub fn data(&self) -> Option<&[u8]> {
    match self {
      Self::Data(data) => Some(data),
      Self::Number(_) | Self::Op(_) => None,
    }
  }
}

pub fn elements_to_script(elements: &[Element]) -> SnafuResult<ScriptBuf> {
  let mut builder = script::Builder::new();

  for element in elements {
    builder = element.push(builder)?;
  }

  Ok(builder.into_script())
}

pub fn script_to_elements(script: &Script) -> SnafuResult<Vec<Element>> {
  script
    .instructions()
    .map(|instruction| {
      instruction.map(Element::from_instruction).ok().ok_or(
        SnafuError::MalformedEnvelope {
          reason: "unparsable script",
        },
      )
    })
    .collect()
}

/// Serialized size in bytes of the script the elements push.
pub fn elements_size(elements: &[Element]) -> SnafuResult<usize> {
  Ok(elements_to_script(elements)?.len())
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Envelope {
  pub content_type: String,
  pub body: Vec<u8>,
}

impl Envelope {
  pub fn encode(content_type: &str, payload: &[u8]) -> SnafuResult<Vec<Element>> {
    if payload.is_empty() {
      return error::EmptyPayload.fail();
    }

    if content_type.len() > MAX_SCRIPT_ELEMENT_SIZE {
      return error::ContentTypeTooLong {
        len: content_type.len(),
      }
      .fail();
    }

    let parts = payload.chunks(MAX_PART_LEN).collect::<Vec<&[u8]>>();

    let count = u16::try_from(parts.len())
      .ok()
      .ok_or(SnafuError::PayloadTooLarge { parts: parts.len() })?;

    let mut elements = vec![
      Element::Data(PROTOCOL_ID.to_vec()),
      Element::Number(count),
      Element::Data(content_type.as_bytes().to_vec()),
    ];

    for (index, part) in (0..count).rev().zip(parts) {
      elements.push(Element::Number(index));
      elements.push(Element::Data(part.to_vec()));
    }

    Ok(elements)
  }

  pub fn decode(elements: &[Element]) -> SnafuResult<Self> {
    let mut elements = elements.iter();

    match elements.next() {
      Some(Element::Data(marker)) if *marker == PROTOCOL_ID => {}
      _ => return error::NotAnInscription.fail(),
    }

    let count = elements
      .next()
      .and_then(Element::number)
      .ok_or(SnafuError::MalformedEnvelope {
        reason: "missing part count",
      })?;

    if count == 0 {
      return error::MalformedEnvelope {
        reason: "envelope has no parts",
      }
      .fail();
    }

    let content_type = elements
      .next()
      .and_then(Element::data)
      .ok_or(SnafuError::MalformedEnvelope {
        reason: "missing content type",
      })?;

    let content_type =
      String::from_utf8(content_type.to_vec()).map_err(|_| SnafuError::MalformedEnvelope {
        reason: "content type is not utf-8",
      })?;

    let mut body = Vec::new();

    for expected in (0..count).rev() {
      let Some(index) = elements.next() else {
        return error::MalformedEnvelope {
          reason: "missing terminating part",
        }
        .fail();
      };

      if index.number() != Some(expected) {
        return error::MalformedEnvelope {
          reason: "part index out of sequence",
        }
        .fail();
      }

      let part = elements
        .next()
        .and_then(Element::data)
        .ok_or(SnafuError::MalformedEnvelope {
          reason: "missing part data",
        })?;

      body.extend_from_slice(part);
    }

    Ok(Self { content_type, body })
  }
}
