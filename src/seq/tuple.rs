use crate::conv::{target::Target, Decode, Encode};
use crate::parse::{ParseResult, Parser};

macro_rules! impl_tuple {
    ( $( $t:ident . $ix:tt ),+ ) => {
        impl<$( $t: Encode ),+> Encode for ( $( $t, )+ ) {
            fn write_to<U: Target>(&self, buf: &mut U) -> usize {
                $( self.$ix.write_to(buf) + )+ crate::resolve_zero!(buf)
            }
        }

        impl<$( $t: Decode ),+> Decode for ( $( $t, )+ ) {
            fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                Ok(( $( $t::parse(p)?, )+ ))
            }
        }
    };
}

impl_tuple!(A.0);
impl_tuple!(A.0, B.1);
impl_tuple!(A.0, B.1, C.2);
impl_tuple!(A.0, B.1, C.2, D.3);
impl_tuple!(A.0, B.1, C.2, D.3, E.4);
impl_tuple!(A.0, B.1, C.2, D.3, E.4, F.5);
