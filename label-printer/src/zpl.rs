//! ZPL command builder
//!
//! Provides a fluent API for building ZPL II label documents.
//! Every command is written on its own line; field data is sanitized
//! so it cannot terminate the field early.

use crate::encoding::{LabelEncoding, sanitize_field};

/// Text justification inside a field block (`^FB`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Center,
    Right,
}

impl Justify {
    fn code(self) -> char {
        match self {
            Justify::Left => 'L',
            Justify::Center => 'C',
            Justify::Right => 'R',
        }
    }
}

/// ZPL command builder
///
/// Accumulates the document as text and encodes it with the configured
/// character set on [`build`](Self::build).
pub struct ZplBuilder {
    buf: String,
    encoding: LabelEncoding,
}

impl ZplBuilder {
    /// Create a new builder for the given character set
    pub fn new(encoding: LabelEncoding) -> Self {
        Self {
            buf: String::with_capacity(512),
            encoding,
        }
    }

    // === Label Control ===

    /// Start of label (`^XA`)
    pub fn start(&mut self) -> &mut Self {
        self.command("^XA")
    }

    /// End of label (`^XZ`)
    pub fn end(&mut self) -> &mut Self {
        self.command("^XZ")
    }

    /// Printable width in dots (`^PW`)
    pub fn print_width(&mut self, dots: u32) -> &mut Self {
        self.command(&format!("^PW{}", dots))
    }

    /// Label home offset in dots (`^LH`)
    pub fn label_home(&mut self, x: u32, y: u32) -> &mut Self {
        self.command(&format!("^LH{},{}", x, y))
    }

    /// Select the builder's character set (`^CI`)
    pub fn charset(&mut self) -> &mut Self {
        let code = self.encoding.ci_code();
        self.command(&format!("^CI{}", code))
    }

    /// Write an empty line (ignored by the printer, groups sections)
    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    // === Fonts ===

    /// Change the default font (`^CF`)
    pub fn default_font(&mut self, font: char, height: u32) -> &mut Self {
        self.command(&format!("^CF{},{}", font, height))
    }

    // === Fields ===

    /// Text field in the default font
    pub fn text(&mut self, x: u32, y: u32, data: &str) -> &mut Self {
        let data = sanitize_field(data);
        self.command(&format!("^FO{},{}^FD{}^FS", x, y, data))
    }

    /// Text field in scalable font 0 with an explicit size (`^A0N`)
    pub fn text_scaled(&mut self, x: u32, y: u32, height: u32, width: u32, data: &str) -> &mut Self {
        let data = sanitize_field(data);
        self.command(&format!(
            "^FO{},{}^A0N,{},{}^FD{}^FS",
            x, y, height, width, data
        ))
    }

    /// Text wrapped inside a field block (`^FB`)
    #[allow(clippy::too_many_arguments)]
    pub fn text_block(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        max_lines: u32,
        line_spacing: i32,
        justify: Justify,
        data: &str,
    ) -> &mut Self {
        let data = sanitize_field(data);
        self.command(&format!(
            "^FO{},{}^FB{},{},{},{}^FD{}^FS",
            x,
            y,
            width,
            max_lines,
            line_spacing,
            justify.code(),
            data
        ))
    }

    /// Filled box or rule (`^GB`)
    pub fn graphic_box(&mut self, x: u32, y: u32, width: u32, height: u32, thickness: u32) -> &mut Self {
        self.command(&format!(
            "^FO{},{}^GB{},{},{}^FS",
            x, y, width, height, thickness
        ))
    }

    // === Barcodes ===

    /// Barcode field defaults (`^BY`): module width, wide-to-narrow ratio, height
    pub fn barcode_defaults(&mut self, module_width: u32, ratio: f32, height: u32) -> &mut Self {
        self.command(&format!("^BY{},{:.1},{}", module_width, ratio, height))
    }

    /// EAN-13 barcode (`^BE`) with the interpretation line below
    ///
    /// The printer computes the check digit; `data` carries the first 12 digits.
    pub fn ean13(&mut self, x: u32, y: u32, height: u32, data: &str) -> &mut Self {
        let data = sanitize_field(data);
        self.command(&format!("^FO{},{}^BEN,{},Y,N^FD{}^FS", x, y, height, data))
    }

    fn command(&mut self, command: &str) -> &mut Self {
        self.buf.push_str(command);
        self.buf.push('\n');
        self
    }

    // === Build ===

    /// Get the document text built so far
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Build the final byte buffer in the configured character set
    pub fn build(self) -> Vec<u8> {
        self.encoding.encode(&self.buf)
    }
}

impl Default for ZplBuilder {
    fn default() -> Self {
        Self::new(LabelEncoding::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_frame() {
        let mut b = ZplBuilder::default();
        b.start().print_width(400).label_home(20, 20).charset().end();
        assert_eq!(b.as_str(), "^XA\n^PW400\n^LH20,20\n^CI28\n^XZ\n");
    }

    #[test]
    fn test_text_fields() {
        let mut b = ZplBuilder::default();
        b.default_font('0', 25);
        b.text(10, 45, "LOPEZ, MARIA");
        b.text_scaled(10, 73, 20, 20, "Menu: Pasta");
        assert_eq!(
            b.as_str(),
            "^CF0,25\n^FO10,45^FDLOPEZ, MARIA^FS\n^FO10,73^A0N,20,20^FDMenu: Pasta^FS\n"
        );
    }

    #[test]
    fn test_field_block_and_rule() {
        let mut b = ZplBuilder::default();
        b.text_block(0, 5, 360, 40, 1, Justify::Center, "LUGAR: Comedor");
        b.graphic_box(0, 35, 360, 2, 2);
        assert_eq!(
            b.as_str(),
            "^FO0,5^FB360,40,1,C^FDLUGAR: Comedor^FS\n^FO0,35^GB360,2,2^FS\n"
        );
    }

    #[test]
    fn test_ean13() {
        let mut b = ZplBuilder::default();
        b.barcode_defaults(2, 3.0, 120);
        b.ean13(40, 175, 120, "000000000123");
        assert_eq!(
            b.as_str(),
            "^BY2,3.0,120\n^FO40,175^BEN,120,Y,N^FD000000000123^FS\n"
        );
    }

    #[test]
    fn test_field_data_cannot_inject_commands() {
        let mut b = ZplBuilder::default();
        b.text(0, 0, "A^XZ");
        assert_eq!(b.as_str(), "^FO0,0^FDA XZ^FS\n");
    }

    #[test]
    fn test_build_uses_charset() {
        let mut b = ZplBuilder::new(LabelEncoding::Windows1252);
        b.charset().text(0, 0, "ñ");
        assert_eq!(b.build(), b"^CI27\n^FO0,0^FD\xF1^FS\n".to_vec());
    }
}
