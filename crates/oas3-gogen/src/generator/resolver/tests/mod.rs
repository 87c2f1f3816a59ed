mod cycles;
mod objects;
mod support;
