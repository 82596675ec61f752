//! Shorthand for implementing the standard operator traits on transparent
//! numeric newtypes.

#[macro_export]
macro_rules! op {
    (binary $t:ty, $tr:ident, $method:ident) => {
        impl std::ops::$tr for $t {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(std::ops::$tr::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $t:ty, $tr:ident, $method:ident) => {
        impl std::ops::$tr for $t {
            fn $method(&mut self, rhs: Self) {
                std::ops::$tr::$method(&mut self.0, rhs.0)
            }
        }
    };
    (unary $t:ty, $tr:ident, $method:ident) => {
        impl std::ops::$tr for $t {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(std::ops::$tr::$method(self.0))
            }
        }
    };
}
