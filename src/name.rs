use core::fmt::Write;

/// Text of at most `N` bytes stored inline, cut on a char boundary.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct FixedStr<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> FixedStr<N> {
    pub(crate) fn new() -> Self {
        Self { buf: [0; N], len: 0 }
    }

    pub(crate) fn with_text(text: &str) -> Self {
        let mut fixed = Self::new();
        fixed.set(text);
        fixed
    }

    pub(crate) fn set(&mut self, text: &str) {
        self.len = 0;
        // never fails, overflow is dropped
        let _ = self.write_str(text);
    }

    pub(crate) fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }
}

impl<const N: usize> Write for FixedStr<N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            let width = c.len_utf8();
            if self.len + width > N {
                break;
            }
            c.encode_utf8(&mut self.buf[self.len..self.len + width]);
            self.len += width;
        }
        Ok(())
    }
}

impl<const N: usize> core::fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self.as_str(), f)
    }
}
