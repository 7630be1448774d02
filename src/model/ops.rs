//! Operator tags carried by binary expressions and attribute operations.

use std::fmt;

macro_rules! operator_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $symbol:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// All operators of this kind
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The operator as written in source
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $symbol),+
                }
            }

            /// Parse the source spelling of the operator
            pub fn from_symbol(symbol: &str) -> Option<Self> {
                match symbol {
                    $($symbol => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

operator_enum!(
    /// `=`, `+=` and `-=`
    AssignmentOp {
        Assign => "=",
        Append => "+=",
        Delete => "-=",
    }
);

operator_enum!(
    ArithmeticOp {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Mod => "%",
        Shl => "<<",
        Shr => ">>",
    }
);

operator_enum!(
    /// Edges between resources: `->`, `<-`, `~>` and `<~`
    RelationshipOp {
        Before => "->",
        Require => "<-",
        Notify => "~>",
        Subscribe => "<~",
    }
);

operator_enum!(
    ComparisonOp {
        Eq => "==",
        Ne => "!=",
        Lt => "<",
        Le => "<=",
        Gt => ">",
        Ge => ">=",
    }
);

operator_enum!(
    MatchOp {
        Match => "=~",
        NoMatch => "!~",
    }
);

operator_enum!(
    /// Resource attribute operators: `=>` sets and `+>` appends
    AttributeOp {
        Set => "=>",
        Append => "+>",
    }
);
