pub mod gmgn;
