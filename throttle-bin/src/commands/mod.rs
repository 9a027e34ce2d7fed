pub(crate) mod check;
pub(crate) mod decide;

pub(crate) use check::check;
pub(crate) use decide::decide;
