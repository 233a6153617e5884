mod density;
mod equilibria;
mod parameters;
mod properties;
