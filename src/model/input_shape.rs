use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RfStackError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputShape {
    pub h: usize,
    pub w: usize,
    pub c: usize,
}

impl Default for InputShape {
    fn default() -> Self {
        Self { h: 224, w: 224, c: 3 }
    }
}

impl InputShape {
    pub fn new(h: usize, w: usize, c: usize) -> Result<Self> {
        if h == 0 || w == 0 || c == 0 {
            return Err(RfStackError::InvalidInputShape { h, w, c });
        }
        Ok(Self { h, w, c })
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}×{}", self.h, self.w, self.c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_imagenet_sized() {
        assert_eq!(InputShape::default(), InputShape { h: 224, w: 224, c: 3 });
        assert_eq!(InputShape::default().to_string(), "224×224×3");
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(InputShape::new(0, 8, 3).is_err());
        assert!(InputShape::new(8, 8, 0).is_err());
        assert_eq!(InputShape::new(8, 4, 1).unwrap(), InputShape { h: 8, w: 4, c: 1 });
    }
}
