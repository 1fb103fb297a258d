use std::io::{self, Write};

/// Indirect object identifier: (object number, generation number).
/// Documents built here never reuse objects, so generation is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub u32, pub u16);

/// The subset of PDF object types (PDF 32000-1:2008 §7.3) this
/// library emits. Image documents never produce null or boolean
/// values, so those kinds are not modeled.
#[derive(Debug, Clone)]
pub enum Obj {
    Int(i64),
    Real(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Literal string, stored without the enclosing parens.
    Text(String),
    Array(Vec<Obj>),
    /// Key order is emission order, for byte-stable output.
    Dict(Vec<(String, Obj)>),
    Stream { dict: Vec<(String, Obj)>, data: Vec<u8> },
    Ref(ObjId),
}

impl Obj {
    pub fn name(s: &str) -> Obj {
        Obj::Name(s.to_string())
    }

    pub fn text(s: &str) -> Obj {
        Obj::Text(s.to_string())
    }

    pub fn dict(entries: Vec<(&str, Obj)>) -> Obj {
        Obj::Dict(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    pub fn stream(dict_entries: Vec<(&str, Obj)>, data: Vec<u8>) -> Obj {
        Obj::Stream {
            dict: dict_entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            data,
        }
    }
}

/// Low-level streaming PDF writer. Serializes objects to any `Write`
/// target while tracking byte offsets for the xref table, and hands
/// out object numbers so callers never have to bookkeep them.
pub struct PdfWriter<W: Write> {
    writer: W,
    offset: usize,
    next_obj_num: u32,
    xref: Vec<(u32, usize)>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        PdfWriter {
            writer,
            offset: 0,
            next_obj_num: 1,
            xref: Vec::new(),
        }
    }

    /// Reserve the next free object number. The object may be written
    /// at any later point; the xref table is assembled at the end.
    pub fn alloc(&mut self) -> ObjId {
        let id = ObjId(self.next_obj_num, 0);
        self.next_obj_num += 1;
        id
    }

    fn put(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    fn put_str(&mut self, s: &str) -> io::Result<()> {
        self.put(s.as_bytes())
    }

    /// Write the PDF 1.7 header and the binary-detection comment.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.put_str("%PDF-1.7\n")?;
        // Four bytes >= 128 so transfer tools treat the file as binary.
        self.put(b"%\xe2\xe3\xcf\xd3\n")?;
        Ok(())
    }

    /// Write an indirect object, recording its byte offset for xref.
    pub fn write_object(&mut self, id: ObjId, obj: &Obj) -> io::Result<()> {
        self.xref.push((id.0, self.offset));
        self.put_str(&format!("{} {} obj\n", id.0, id.1))?;
        self.serialize(obj)?;
        self.put_str("\nendobj\n")?;
        Ok(())
    }

    fn serialize(&mut self, obj: &Obj) -> io::Result<()> {
        match obj {
            Obj::Int(n) => self.put_str(&n.to_string()),
            Obj::Real(v) => self.put_str(&fmt_num(*v)),
            Obj::Name(name) => {
                self.put_str("/")?;
                self.put_str(name)
            }
            Obj::Text(s) => {
                self.put_str("(")?;
                self.put_str(&escape_text(s))?;
                self.put_str(")")
            }
            Obj::Array(items) => {
                self.put_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.put_str(" ")?;
                    }
                    self.serialize(item)?;
                }
                self.put_str("]")
            }
            Obj::Dict(entries) => self.serialize_dict(entries),
            Obj::Stream { dict, data } => {
                // /Length is appended automatically from the payload.
                self.put_str("<<")?;
                for (key, val) in dict {
                    self.put_str(" /")?;
                    self.put_str(key)?;
                    self.put_str(" ")?;
                    self.serialize(val)?;
                }
                self.put_str(" /Length ")?;
                self.put_str(&data.len().to_string())?;
                self.put_str(" >>\nstream\n")?;
                self.put(data)?;
                self.put_str("\nendstream")
            }
            Obj::Ref(id) => self.put_str(&format!("{} {} R", id.0, id.1)),
        }
    }

    fn serialize_dict(&mut self, entries: &[(String, Obj)]) -> io::Result<()> {
        self.put_str("<<")?;
        for (key, val) in entries {
            self.put_str(" /")?;
            self.put_str(key)?;
            self.put_str(" ")?;
            self.serialize(val)?;
        }
        self.put_str(" >>")
    }

    /// Write the xref table, trailer, startxref, and %%EOF marker,
    /// then hand back the inner writer.
    pub fn finish(mut self, root_id: ObjId, info_id: Option<ObjId>) -> io::Result<W> {
        let xref_offset = self.offset;

        self.xref.sort_by_key(|&(num, _)| num);
        let max_obj = self.xref.last().map(|&(num, _)| num).unwrap_or(0);
        let size = max_obj + 1;

        self.put_str("xref\n")?;
        self.put_str(&format!("0 {}\n", size))?;
        // Object 0 heads the free list. Every entry is exactly 20 bytes.
        self.put(b"0000000000 65535 f\r\n")?;

        let mut offsets = std::collections::HashMap::new();
        for &(num, off) in &self.xref {
            offsets.insert(num, off);
        }
        for obj_num in 1..size {
            match offsets.get(&obj_num) {
                Some(&off) => {
                    self.put_str(&format!("{:010} 00000 n\r\n", off))?;
                }
                // Allocated but never written: a free entry fills the gap.
                None => self.put(b"0000000000 00000 f\r\n")?,
            }
        }

        self.put_str("trailer\n")?;
        self.put_str(&format!("<< /Size {} /Root {} {} R", size, root_id.0, root_id.1))?;
        if let Some(info) = info_id {
            self.put_str(&format!(" /Info {} {} R", info.0, info.1))?;
        }
        self.put_str(" >>\n")?;
        self.put_str("startxref\n")?;
        self.put_str(&format!("{}\n", xref_offset))?;
        self.put_str("%%EOF\n")?;

        Ok(self.writer)
    }
}

/// Escape the characters PDF literal strings reserve.
pub(crate) fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a number for PDF output: integers bare, fractions trimmed
/// to four decimals, never scientific notation.
pub(crate) fn fmt_num(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        let s = s.trim_end_matches('0');
        s.trim_end_matches('.').to_string()
    }
}
