mod button;

pub(crate) use button::button;
