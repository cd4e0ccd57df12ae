use crate::il;
use crate::Error;

/// Evaluate a binary operator over two concrete constants.
///
/// Booleans take part in arithmetic as 0 and 1. Arithmetic which overflows an
/// `i64` is an error.
pub fn binary(
    op: il::BinaryOperator,
    lhs: il::Constant,
    rhs: il::Constant,
) -> Result<il::Constant, Error> {
    let (l, r) = (lhs.value(), rhs.value());
    Ok(match op {
        il::BinaryOperator::Add => il::Constant::Int(
            l.checked_add(r)
                .ok_or_else(|| Error::Arithmetic(format!("{} + {} overflows", l, r)))?,
        ),
        il::BinaryOperator::Mul => il::Constant::Int(
            l.checked_mul(r)
                .ok_or_else(|| Error::Arithmetic(format!("{} * {} overflows", l, r)))?,
        ),
        il::BinaryOperator::Lth => il::Constant::Bool(l < r),
        il::BinaryOperator::Geq => il::Constant::Bool(l >= r),
    })
}
